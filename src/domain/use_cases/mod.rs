pub mod ai;
pub mod auth;
pub mod categories;
pub mod contact;
pub mod extractors;
pub mod gallery;
pub mod sync;
