//! Archive classification and safety validation.
//!
//! Uploads are classified as zip archives by extension plus a central
//! directory parse, then run through a fixed sequence of metadata-only
//! safety gates (size ceiling, entry count, compression-bomb ratio, path
//! safety, name length, encryption). Entry contents are never inflated;
//! everything here reads central-directory metadata from an in-memory
//! buffer.

pub mod inspect;
pub mod limits;
pub mod rejection;

pub use inspect::{inspect, list_entries, ArchiveCheck, EntryMeta};
pub use limits::ArchiveLimits;
pub use rejection::ArchiveRejection;
