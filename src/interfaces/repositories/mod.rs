pub mod category;
pub mod image;
pub mod sqlx_repo;
pub mod storage;
pub mod token;
pub mod vendors;
