pub mod admin_images;
pub mod ai;
pub mod auth;
pub mod categories;
pub mod contact_me;
pub mod home;
pub mod images;
pub mod json_error;
pub mod media;
pub mod sync;
pub mod system;
