pub mod assembler;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod process;
pub mod query;
pub mod subscription;
pub mod summary;
