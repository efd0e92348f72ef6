/// Reason an archive failed validation. Gates run in a fixed order and the
/// first violation wins, except encryption which reports every affected
/// entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArchiveRejection {
    #[error("Archive too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Archive contains too many entries: {count} (max {max})")]
    TooManyEntries { count: usize, max: usize },

    #[error("Suspicious compression ratio for entry '{path}': {ratio:.4}")]
    SuspiciousCompression { path: String, ratio: f64 },

    #[error("Unsafe path in archive: '{path}'")]
    UnsafePath { path: String },

    #[error("Entry name too long ({len} characters): '{path}'")]
    NameTooLong { path: String, len: usize },

    #[error("Archive contains encrypted entries: {}", .paths.join(", "))]
    EncryptedEntries { paths: Vec<String> },
}
