use serde::{Deserialize, Serialize};

/// Server-side user record as cached by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn avatar_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.avatar.as_deref().filter(|a| !a.is_empty()).unwrap_or(fallback)
    }
}

/// Body of `PUT /users/{id}`; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn avatar(url: impl Into<String>) -> Self {
        Self {
            avatar: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Text fields of the update form, read at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl ProfileForm {
    /// The password is sent as typed, empty included.
    pub fn into_patch(self, avatar: Option<String>) -> UserPatch {
        UserPatch {
            username: Some(self.username),
            email: Some(self.email),
            password: Some(self.password),
            avatar,
        }
    }
}
