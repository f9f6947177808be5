pub mod api;
pub mod file;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod storage;
pub mod upload;
