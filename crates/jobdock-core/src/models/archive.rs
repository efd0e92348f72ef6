use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Percentage reduction achieved by compression, rounded to two decimals.
/// Returns 0.0 when the uncompressed size is zero.
pub fn compression_reduction(uncompressed: u64, compressed: u64) -> f64 {
    if uncompressed == 0 {
        return 0.0;
    }
    let ratio = (1.0 - compressed as f64 / uncompressed as f64) * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// A single file entry in an archive manifest. Directory entries are not
/// represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArchiveEntry {
    pub path: String,
    pub size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub modified: Option<NaiveDateTime>,
    pub encrypted: bool,
    pub content_type: String,
}

/// Aggregate view over a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveSummary {
    pub total_entries: usize,
    pub total_size: u64,
    pub total_compressed_size: u64,
    pub compression_ratio: f64,
    pub has_encrypted: bool,
}

impl ArchiveSummary {
    pub fn from_entries(entries: &[ArchiveEntry]) -> Self {
        let total_size: u64 = entries.iter().map(|e| e.size).sum();
        let total_compressed_size: u64 = entries.iter().map(|e| e.compressed_size).sum();
        ArchiveSummary {
            total_entries: entries.len(),
            total_size,
            total_compressed_size,
            compression_ratio: compression_reduction(total_size, total_compressed_size),
            has_encrypted: entries.iter().any(|e| e.encrypted),
        }
    }
}
