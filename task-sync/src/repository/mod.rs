// src/repository/mod.rs
pub mod attachment_repository;
pub mod relation_directory;
pub mod task_gateway;
