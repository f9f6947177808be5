use futures::future::{FutureExt, LocalBoxFuture};
use reqwasm::http::Request;
use web_sys::RequestCredentials;

use crate::errors::ApiError;
use crate::models::{User, UserPatch};

/// Backend user resource.
pub trait UserApi {
    /// `PUT /users/{id}`, returning the record as stored by the server.
    fn update_user<'a>(
        &'a self,
        id: &'a str,
        patch: &'a UserPatch,
    ) -> LocalBoxFuture<'a, Result<User, ApiError>>;
}

pub struct HttpUserApi {
    base_url: String,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/users/{}", self.base_url.trim_end_matches('/'), id)
    }

    async fn put_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError> {
        let body = serde_json::to_string(patch)?;
        let response = Request::put(&self.user_url(id))
            .header("Content-Type", "application/json")
            .credentials(RequestCredentials::Include)
            .body(body)
            .send()
            .await?;

        if !response.ok() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(response.status(), &text));
        }

        response
            .json::<User>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl UserApi for HttpUserApi {
    fn update_user<'a>(
        &'a self,
        id: &'a str,
        patch: &'a UserPatch,
    ) -> LocalBoxFuture<'a, Result<User, ApiError>> {
        log::debug!("PUT {}", self.user_url(id));
        self.put_user(id, patch).boxed_local()
    }
}
