pub mod archive;
pub mod job;

pub use archive::{compression_reduction, ArchiveEntry, ArchiveSummary};
pub use job::{FileKind, Job, JobResponse, JobStatus};
