pub mod home;
pub mod navbar;
pub mod profile;
pub mod profile_update;
