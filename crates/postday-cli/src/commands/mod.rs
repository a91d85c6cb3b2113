pub mod config;
pub mod posts;
pub mod session;
