// src/lib.rs
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod repository;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::SyncConfig;
pub use error::{AppError, AppResult};
pub use types::OperationResult;
