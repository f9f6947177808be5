//! Avatar replacement: local selection, resumable transfer, and the record
//! update that points the user at the stored image.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::errors::StorageError;
use crate::models::UserPatch;
use crate::services::api::UserApi;
use crate::services::file::{LocalPreview, SelectedFile};
use crate::services::storage::{ObjectStorage, TransferProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started,
    Progress(u8),
    Succeeded(String),
    Failed(String),
}

/// Sending half of an upload's event stream. The stream ends when the last
/// clone is dropped; nobody listening is fine.
#[derive(Clone, Default)]
pub struct UploadEvents {
    tx: Option<UnboundedSender<UploadEvent>>,
}

impl UploadEvents {
    pub fn channel() -> (Self, UnboundedReceiver<UploadEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn detached() -> Self {
        Self::default()
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.tx {
            if tx.unbounded_send(event).is_err() {
                log::debug!("upload event dropped, receiver gone");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selected,
    Uploading { progress: u8 },
    Succeeded { url: String },
    Failed { error: String },
}

#[derive(Debug)]
enum Preview {
    Remote(String),
    Local(LocalPreview),
}

/// What a submission has to do about the avatar.
#[derive(Clone)]
pub enum AvatarChange {
    Keep,
    Upload(SelectedFile),
    Uploaded(String),
}

/// Page-local avatar edit: the picked file, what to display, and where the
/// latest upload attempt stands.
pub struct PendingAvatar {
    current: String,
    file: Option<SelectedFile>,
    preview: Preview,
    state: UploadState,
}

impl PendingAvatar {
    pub fn new(current: impl Into<String>) -> Self {
        let current = current.into();
        Self {
            preview: Preview::Remote(current.clone()),
            current,
            file: None,
            state: UploadState::Idle,
        }
    }

    /// Keeps `file` for the next submit and shows it locally. Any previous
    /// local preview is released.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), StorageError> {
        let preview = file.preview()?;
        log::debug!("avatar selected: {} ({} bytes)", file.name(), file.size());
        self.preview = Preview::Local(preview);
        self.file = Some(file);
        self.state = UploadState::Selected;
        Ok(())
    }

    /// Hands the pending work to a submission. A selected file moves the
    /// state to uploading; it is not handed out twice.
    pub fn take_change(&mut self) -> AvatarChange {
        if let Some(file) = self.file.take() {
            self.state = UploadState::Uploading { progress: 0 };
            return AvatarChange::Upload(file);
        }
        match &self.state {
            UploadState::Succeeded { url } => AvatarChange::Uploaded(url.clone()),
            _ => AvatarChange::Keep,
        }
    }

    pub fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Started => self.state = UploadState::Uploading { progress: 0 },
            UploadEvent::Progress(progress) => {
                self.state = UploadState::Uploading {
                    progress: progress.min(100),
                }
            }
            UploadEvent::Succeeded(url) => {
                self.preview = Preview::Remote(url.clone());
                self.state = UploadState::Succeeded { url };
            }
            UploadEvent::Failed(error) => {
                self.file = None;
                self.preview = Preview::Remote(self.current.clone());
                self.state = UploadState::Failed { error };
            }
        }
    }

    /// Closes an attempt that ended without an upload outcome, e.g. when the
    /// submission failed before the transfer began.
    pub fn settle_failed(&mut self, error: impl Into<String>) {
        if let UploadState::Uploading { .. } = self.state {
            self.apply(UploadEvent::Failed(error.into()));
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn preview_url(&self) -> &str {
        match &self.preview {
            Preview::Remote(url) => url,
            Preview::Local(preview) => preview.url(),
        }
    }

    pub fn progress(&self) -> u8 {
        match &self.state {
            UploadState::Uploading { progress } => *progress,
            UploadState::Succeeded { .. } => 100,
            _ => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Storage key for an owner's file. Same owner and file name overwrite.
pub fn object_key(owner_id: &str, file_name: &str) -> String {
    format!("{}-{}", owner_id, file_name)
}

/// Uploads `file` for `owner_id` and records the resulting URL on the user.
///
/// The returned URL is always the storage-issued one. A failed record update
/// is logged and does not fail the upload; the stored object is kept.
pub async fn upload_avatar(
    storage: &dyn ObjectStorage,
    api: &dyn UserApi,
    file: &SelectedFile,
    owner_id: &str,
    events: &UploadEvents,
) -> Result<String, StorageError> {
    let key = object_key(owner_id, &file.name());
    events.emit(UploadEvent::Started);

    let on_progress = |p: TransferProgress| events.emit(UploadEvent::Progress(p.percent()));
    let transferred = storage.upload(&key, file.as_ref(), &on_progress).await;
    let url = match transferred {
        Ok(object) => storage.download_url(&object).await,
        Err(e) => Err(e),
    };
    let url = match url {
        Ok(url) => url,
        Err(e) => {
            log::error!("avatar upload for {} failed: {}", key, e);
            events.emit(UploadEvent::Failed(e.to_string()));
            return Err(e);
        }
    };

    if let Err(e) = api.update_user(owner_id, &UserPatch::avatar(url.clone())).await {
        log::error!("error updating user avatar URL: {}", e);
    }
    log::info!("avatar stored at {}", url);
    events.emit(UploadEvent::Succeeded(url.clone()));
    Ok(url)
}
