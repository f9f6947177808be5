use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage transport error: {0}")]
    Transport(String),
    #[error("storage rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected storage response: {0}")]
    Protocol(String),
    #[error("could not read file: {0}")]
    Read(String),
    #[error("could not create preview: {0}")]
    Preview(String),
}

impl From<reqwasm::Error> for StorageError {
    fn from(err: reqwasm::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwasm::Error> for ApiError {
    fn from(err: reqwasm::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Builds a status error from a raw response body, preferring the
    /// backend's `{"message": ...}` field over the raw text.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) if body.trim().is_empty() => String::from("no details"),
            Err(_) => body.trim().to_string(),
        };
        ApiError::Status { status, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("avatar upload failed: {0}")]
    Upload(#[from] StorageError),
    #[error("profile update failed: {0}")]
    Api(#[from] ApiError),
}
