//! Recording doubles for the storage, API, session and router seams.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::errors::{ApiError, StorageError};
use crate::models::{User, UserPatch};
use crate::services::api::UserApi;
use crate::services::file::{FileSource, LocalPreview};
use crate::services::navigation::Navigator;
use crate::services::session::SessionStore;
use crate::services::storage::{ObjectStorage, StoredObject, TransferProgress};
use crate::Route;

pub fn sample_user() -> User {
    User {
        id: "42".into(),
        username: "bob".into(),
        email: "bob@example.com".into(),
        avatar: Some("old.png".into()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload(String),
    DownloadUrl(String),
    UpdateUser(String, UserPatch),
    Released(String),
    Navigate(Route),
}

/// Shared, ordered log of every call made on the doubles built from it.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Call>>>);

impl Recorder {
    pub fn record(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn storage(&self) -> FakeStorage {
        FakeStorage {
            recorder: self.clone(),
            fail_upload: None,
        }
    }

    pub fn api(&self) -> FakeApi {
        FakeApi {
            recorder: self.clone(),
            stored: RefCell::new(sample_user()),
            fail_status: None,
        }
    }

    pub fn navigator(&self) -> RecordingNavigator {
        RecordingNavigator(self.clone())
    }
}

pub struct FakeFile {
    name: String,
    size: u64,
    released: Option<Recorder>,
}

impl FakeFile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            size: 10,
            released: None,
        }
    }

    pub fn with_bytes(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn releasing_into(mut self, recorder: &Recorder) -> Self {
        self.released = Some(recorder.clone());
        self
    }
}

impl FileSource for FakeFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn content_type(&self) -> String {
        String::from("image/jpeg")
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>, StorageError>> {
        future::ready(Ok(vec![0u8; self.size as usize])).boxed_local()
    }

    fn preview(&self) -> Result<LocalPreview, StorageError> {
        let recorder = self.released.clone();
        Ok(LocalPreview::new(format!("blob:{}", self.name), move |url| {
            if let Some(recorder) = recorder {
                recorder.record(Call::Released(url.to_string()));
            }
        }))
    }
}

/// Reports half and full progress, then hands out `https://storage/{key}`.
pub struct FakeStorage {
    recorder: Recorder,
    fail_upload: Option<String>,
}

impl FakeStorage {
    pub fn failing_upload(mut self, message: &str) -> Self {
        self.fail_upload = Some(message.into());
        self
    }
}

impl ObjectStorage for FakeStorage {
    fn upload<'a>(
        &'a self,
        key: &'a str,
        file: &'a dyn FileSource,
        on_progress: &'a dyn Fn(TransferProgress),
    ) -> LocalBoxFuture<'a, Result<StoredObject, StorageError>> {
        self.recorder.record(Call::Upload(key.into()));
        if let Some(message) = &self.fail_upload {
            return future::ready(Err(StorageError::Transport(message.clone()))).boxed_local();
        }
        let total = file.size();
        for done in [total / 2, total] {
            on_progress(TransferProgress {
                bytes_transferred: done,
                total_bytes: total,
            });
        }
        future::ready(Ok(StoredObject {
            name: key.into(),
            bucket: "test".into(),
            download_tokens: Some("token".into()),
        }))
        .boxed_local()
    }

    fn download_url<'a>(
        &'a self,
        object: &'a StoredObject,
    ) -> LocalBoxFuture<'a, Result<String, StorageError>> {
        self.recorder.record(Call::DownloadUrl(object.name.clone()));
        future::ready(Ok(format!("https://storage/{}", object.name))).boxed_local()
    }
}

/// Applies patches to an in-memory record and echoes it back.
pub struct FakeApi {
    recorder: Recorder,
    stored: RefCell<User>,
    fail_status: Option<u16>,
}

impl FakeApi {
    pub fn failing_with(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }
}

impl UserApi for FakeApi {
    fn update_user<'a>(
        &'a self,
        id: &'a str,
        patch: &'a UserPatch,
    ) -> LocalBoxFuture<'a, Result<User, ApiError>> {
        self.recorder.record(Call::UpdateUser(id.into(), patch.clone()));
        if let Some(status) = self.fail_status {
            return future::ready(Err(ApiError::Status {
                status,
                message: "update rejected".into(),
            }))
            .boxed_local();
        }
        let mut user = self.stored.borrow_mut();
        user.id = id.into();
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(avatar) = &patch.avatar {
            user.avatar = Some(avatar.clone());
        }
        future::ready(Ok(user.clone())).boxed_local()
    }
}

pub struct RecordingNavigator(Recorder);

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.0.record(Call::Navigate(route));
    }
}

#[derive(Default)]
pub struct MemoryStore(RefCell<Option<User>>);

impl MemoryStore {
    pub fn with(user: User) -> Self {
        Self(RefCell::new(Some(user)))
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<User> {
        self.0.borrow().clone()
    }

    fn save(&self, user: &User) {
        *self.0.borrow_mut() = Some(user.clone());
    }
}
