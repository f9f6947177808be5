use futures::future::{FutureExt, LocalBoxFuture};
use reqwasm::http::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use crate::errors::StorageError;
use crate::services::file::FileSource;

/// Bytes acknowledged by storage so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Whole percent, clamped to 0..=100. An empty transfer counts as done.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        let done = self.bytes_transferred.min(self.total_bytes);
        (done * 100 / self.total_bytes) as u8
    }
}

/// Object metadata returned once a transfer is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub name: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub download_tokens: Option<String>,
}

pub trait ObjectStorage {
    /// Transfers `file` under `key`, calling `on_progress` as chunks land.
    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a dyn FileSource,
        on_progress: &'a dyn Fn(TransferProgress),
    ) -> LocalBoxFuture<'a, Result<StoredObject, StorageError>>;

    /// Resolves the permanent download URL of an uploaded object.
    fn download_url<'a>(
        &'a self,
        object: &'a StoredObject,
    ) -> LocalBoxFuture<'a, Result<String, StorageError>>;
}

/// Firebase Storage over its REST resumable-upload protocol.
pub struct FirebaseStorage {
    endpoint: String,
    bucket: String,
    chunk_size: usize,
}

const UPLOAD_URL_HEADER: &str = "X-Goog-Upload-URL";
const UPLOAD_STATUS_HEADER: &str = "X-Goog-Upload-Status";

impl FirebaseStorage {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    fn objects_url(&self) -> String {
        format!(
            "{}/v0/b/{}/o",
            self.endpoint.trim_end_matches('/'),
            encode_component(&self.bucket)
        )
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/{}", self.objects_url(), encode_component(name))
    }

    fn start_url(&self, name: &str) -> String {
        format!("{}?name={}", self.objects_url(), encode_component(name))
    }

    fn media_url(&self, name: &str, token: &str) -> String {
        format!(
            "{}?alt=media&token={}",
            self.object_url(name),
            encode_component(token)
        )
    }

    async fn start(&self, key: &str, file: &dyn FileSource, total: u64) -> Result<String, StorageError> {
        let metadata = json!({ "name": key, "contentType": file.content_type() });
        let response = Request::post(&self.start_url(key))
            .header("Content-Type", "application/json; charset=utf-8")
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", &total.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &file.content_type())
            .body(metadata.to_string())
            .send()
            .await?;
        let response = check(response).await?;
        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .ok()
            .flatten()
            .ok_or_else(|| StorageError::Protocol(format!("missing {} header", UPLOAD_URL_HEADER)))
    }

    async fn transfer(
        &self,
        key: &str,
        file: &dyn FileSource,
        on_progress: &dyn Fn(TransferProgress),
    ) -> Result<StoredObject, StorageError> {
        let bytes = file.read().await?;
        let total = bytes.len() as u64;
        let session_url = self.start(key, file, total).await?;
        log::debug!("resumable session opened for {} ({} bytes)", key, total);

        for chunk in chunk_plan(bytes.len(), self.chunk_size) {
            let command = if chunk.last { "upload, finalize" } else { "upload" };
            let body = js_sys::Uint8Array::from(&bytes[chunk.start..chunk.end]);
            let response = Request::post(&session_url)
                .header("X-Goog-Upload-Command", command)
                .header("X-Goog-Upload-Offset", &chunk.start.to_string())
                .body(body)
                .send()
                .await?;
            let response = check(response).await?;

            on_progress(TransferProgress {
                bytes_transferred: chunk.end as u64,
                total_bytes: total,
            });

            let status = response.headers().get(UPLOAD_STATUS_HEADER).ok().flatten();
            match chunk_outcome(chunk.last, status.as_deref())? {
                ChunkOutcome::Finalized => {
                    return response
                        .json::<StoredObject>()
                        .await
                        .map_err(|e| StorageError::Protocol(e.to_string()));
                }
                ChunkOutcome::Continue => {}
            }
        }

        Err(StorageError::Protocol(String::from("upload ended without finalizing")))
    }

    async fn resolve_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        let token = match first_token(object.download_tokens.as_deref()) {
            Some(token) => token.to_string(),
            None => {
                let response = Request::get(&self.object_url(&object.name)).send().await?;
                let metadata = check(response)
                    .await?
                    .json::<StoredObject>()
                    .await
                    .map_err(|e| StorageError::Protocol(e.to_string()))?;
                first_token(metadata.download_tokens.as_deref())
                    .map(str::to_string)
                    .ok_or_else(|| StorageError::Protocol(format!("{} has no download token", object.name)))?
            }
        };
        Ok(self.media_url(&object.name, &token))
    }
}

impl ObjectStorage for FirebaseStorage {
    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a dyn FileSource,
        on_progress: &'a dyn Fn(TransferProgress),
    ) -> LocalBoxFuture<'a, Result<StoredObject, StorageError>> {
        self.transfer(key, file, on_progress).boxed_local()
    }

    fn download_url<'a>(
        &'a self,
        object: &'a StoredObject,
    ) -> LocalBoxFuture<'a, Result<String, StorageError>> {
        self.resolve_url(object).boxed_local()
    }
}

async fn check(response: Response) -> Result<Response, StorageError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    Err(StorageError::Rejected { status, message })
}

fn encode_component(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn first_token(tokens: Option<&str>) -> Option<&str> {
    tokens?.split(',').map(str::trim).find(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Chunk {
    start: usize,
    end: usize,
    last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkOutcome {
    Continue,
    Finalized,
}

/// What to do after a chunk was accepted, given the session status header.
fn chunk_outcome(last: bool, status: Option<&str>) -> Result<ChunkOutcome, StorageError> {
    match status {
        _ if last => Ok(ChunkOutcome::Finalized),
        Some("final") => Ok(ChunkOutcome::Finalized),
        Some("active") => Ok(ChunkOutcome::Continue),
        other => Err(StorageError::Protocol(format!(
            "upload session reported status {:?}",
            other
        ))),
    }
}

/// Byte ranges sent in order; an empty file is still one finalizing request.
fn chunk_plan(len: usize, chunk_size: usize) -> Vec<Chunk> {
    if len == 0 {
        return vec![Chunk {
            start: 0,
            end: 0,
            last: true,
        }];
    }
    (0..len)
        .step_by(chunk_size)
        .map(|start| {
            let end = (start + chunk_size).min(len);
            Chunk {
                start,
                end,
                last: end == len,
            }
        })
        .collect()
}
