//! Build-time configuration.
//!
//! Every value has a default suited to local development; the endpoints can
//! be overridden when compiling, e.g.
//! `ESTATE_API_URL=https://api.example.com trunk build --release`.

pub const DEFAULT_API_URL: &str = "http://localhost:8800/api";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://firebasestorage.googleapis.com";
pub const DEFAULT_STORAGE_BUCKET: &str = "antoine-estate.appspot.com";
pub const DEFAULT_AVATAR: &str = "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcS4k-EK9bwaXD1R_HGLkKam2lQJBpUZ6BB-5iWwW0nUXQ&s";
pub const SESSION_KEY: &str = "user";
/// Resumable uploads must send chunks in multiples of 256 KiB.
pub const UPLOAD_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub storage_endpoint: String,
    pub storage_bucket: String,
    pub upload_chunk_size: usize,
    pub default_avatar: String,
    pub session_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            upload_chunk_size: UPLOAD_CHUNK_SIZE,
            default_avatar: DEFAULT_AVATAR.to_string(),
            session_key: SESSION_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with whatever was set in the build environment.
    pub fn from_build_env() -> Self {
        Self::default().with_overrides(
            option_env!("ESTATE_API_URL"),
            option_env!("ESTATE_STORAGE_ENDPOINT"),
            option_env!("ESTATE_STORAGE_BUCKET"),
        )
    }

    fn with_overrides(
        mut self,
        api_url: Option<&str>,
        storage_endpoint: Option<&str>,
        storage_bucket: Option<&str>,
    ) -> Self {
        if let Some(url) = non_empty(api_url) {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = non_empty(storage_endpoint) {
            self.storage_endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(bucket) = non_empty(storage_bucket) {
            self.storage_bucket = bucket.to_string();
        }
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
