pub mod auth;
pub mod db;
pub mod imaging;
pub mod limiter;
pub mod storage;
pub mod utils;
pub mod vendors;
