use std::fmt;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen_futures::JsFuture;

use crate::errors::StorageError;

/// A file chosen by the user, readable without knowing where it came from.
pub trait FileSource {
    fn name(&self) -> String;
    fn content_type(&self) -> String;
    fn size(&self) -> u64;
    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>, StorageError>>;
    fn preview(&self) -> Result<LocalPreview, StorageError>;
}

pub type SelectedFile = Rc<dyn FileSource>;

/// A local reference to a picked file, released when dropped.
pub struct LocalPreview {
    url: String,
    release: Option<Box<dyn FnOnce(&str)>>,
}

impl LocalPreview {
    pub fn new(url: impl Into<String>, release: impl FnOnce(&str) + 'static) -> Self {
        Self {
            url: url.into(),
            release: Some(Box::new(release)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for LocalPreview {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.url);
        }
    }
}

impl fmt::Debug for LocalPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPreview").field("url", &self.url).finish()
    }
}

/// `web_sys::File` from an `<input type="file">`.
#[derive(Clone)]
pub struct BrowserFile(web_sys::File);

impl BrowserFile {
    pub fn new(file: web_sys::File) -> Self {
        Self(file)
    }
}

impl FileSource for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn content_type(&self) -> String {
        match self.0.type_() {
            t if t.is_empty() => String::from("application/octet-stream"),
            t => t,
        }
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>, StorageError>> {
        let buffer = JsFuture::from(self.0.array_buffer());
        async move {
            let buffer = buffer
                .await
                .map_err(|e| StorageError::Read(format!("{:?}", e)))?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }
        .boxed_local()
    }

    fn preview(&self) -> Result<LocalPreview, StorageError> {
        let url = web_sys::Url::create_object_url_with_blob(&self.0)
            .map_err(|e| StorageError::Preview(format!("{:?}", e)))?;
        Ok(LocalPreview::new(url, |url| {
            if let Err(e) = web_sys::Url::revoke_object_url(url) {
                log::warn!("failed to revoke {}: {:?}", url, e);
            }
        }))
    }
}
