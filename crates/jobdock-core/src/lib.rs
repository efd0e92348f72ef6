//! Jobdock Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across all jobdock components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ArchiveEntry, ArchiveSummary, FileKind, Job, JobResponse, JobStatus};
pub use storage_types::StorageBackend;
