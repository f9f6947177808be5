use std::cell::RefCell;
use std::rc::Rc;

use crate::models::User;

/// Where the cached user survives page reloads.
pub trait SessionStore {
    fn load(&self) -> Option<User>;
    fn save(&self, user: &User);
}

/// `window.localStorage`, JSON encoded under a single key.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl SessionStore for LocalStorageStore {
    fn load(&self) -> Option<User> {
        let raw = Self::storage()?.get_item(&self.key).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("discarding unreadable session record: {}", e);
                None
            }
        }
    }

    fn save(&self, user: &User) {
        let storage = match Self::storage() {
            Some(storage) => storage,
            None => {
                log::warn!("localStorage unavailable, session not persisted");
                return;
            }
        };
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(e) = storage.set_item(&self.key, &raw) {
                    log::error!("failed to persist session: {:?}", e);
                }
            }
            Err(e) => log::error!("failed to encode session: {}", e),
        }
    }
}

/// Shared handle to the signed-in user.
///
/// Clones share the same record. [`Session::update_user`] is the only
/// mutation and must only be fed records confirmed by the backend.
#[derive(Clone, Default)]
pub struct Session {
    user: Rc<RefCell<Option<User>>>,
    store: Option<Rc<dyn SessionStore>>,
}

impl Session {
    pub fn new(user: Option<User>) -> Self {
        Self {
            user: Rc::new(RefCell::new(user)),
            store: None,
        }
    }

    pub fn restore(store: Rc<dyn SessionStore>) -> Self {
        let user = store.load();
        log::debug!("session restored, signed in: {}", user.is_some());
        Self {
            user: Rc::new(RefCell::new(user)),
            store: Some(store),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn update_user(&self, user: User) {
        if let Some(store) = &self.store {
            store.save(&user);
        }
        *self.user.borrow_mut() = Some(user);
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.user, &other.user)
    }
}
