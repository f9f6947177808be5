pub mod user;

pub use user::{ProfileForm, User, UserPatch};
