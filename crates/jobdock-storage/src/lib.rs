//! Object storage gateway.
//!
//! The `ObjectStorage` trait abstracts over the S3 backend (AWS or any
//! S3-compatible provider such as MinIO) and a local-filesystem backend
//! used in development and tests. Keys are generated centrally as
//! `jobs/{uuid}{ext}`; callers never pick their own keys on upload.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use keys::{generate_object_key, resolve_content_type};
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
