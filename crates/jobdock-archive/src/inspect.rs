//! Classification and gate evaluation over in-memory zip buffers.

use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime};
use zip::ZipArchive;

use jobdock_core::models::{compression_reduction, ArchiveEntry};

use crate::limits::{ArchiveLimits, BOMB_RATIO_THRESHOLD, MAX_NAME_LEN};
use crate::rejection::ArchiveRejection;

/// Central-directory metadata for one entry, directories included.
/// Collected once per buffer; every gate reads from this.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    pub path: String,
    pub size: u64,
    pub compressed_size: u64,
    pub encrypted: bool,
    pub is_dir: bool,
    pub modified: Option<NaiveDateTime>,
}

/// Outcome of classifying and validating an upload.
#[derive(Debug, Clone)]
pub enum ArchiveCheck {
    /// Not a zip archive; the upload is stored as-is.
    NotAnArchive,
    /// A valid archive with its manifest (directory entries excluded).
    Valid(Vec<ArchiveEntry>),
    /// A zip archive that failed a safety gate.
    Rejected(ArchiveRejection),
}

/// Classify a buffer and, if it is an archive, run the safety gates.
///
/// A buffer is an archive only when the filename carries a `.zip`
/// extension (case-insensitive) and the central directory parses. Anything
/// else, including a corrupt `.zip`, is `NotAnArchive` rather than an
/// error.
pub fn inspect(data: &[u8], filename: &str, limits: &ArchiveLimits) -> ArchiveCheck {
    if !has_zip_extension(filename) {
        return ArchiveCheck::NotAnArchive;
    }
    let Some(entries) = collect_entries(data) else {
        tracing::debug!(filename, "zip extension but central directory does not parse");
        return ArchiveCheck::NotAnArchive;
    };
    match validate(data.len() as u64, &entries, limits) {
        Ok(()) => ArchiveCheck::Valid(to_manifest(&entries)),
        Err(rejection) => {
            tracing::debug!(filename, %rejection, "archive rejected");
            ArchiveCheck::Rejected(rejection)
        }
    }
}

/// Re-derive a manifest from a stored buffer without applying gates.
/// Returns `None` when the buffer is not parseable as a zip.
pub fn list_entries(data: &[u8]) -> Option<Vec<ArchiveEntry>> {
    collect_entries(data).map(|entries| to_manifest(&entries))
}

fn has_zip_extension(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".zip")
}

fn collect_entries(data: &[u8]) -> Option<Vec<EntryMeta>> {
    let mut archive = ZipArchive::new(Cursor::new(data)).ok()?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        // by_index_raw reads metadata only, so encrypted entries are
        // visible without decryption and nothing is inflated.
        let file = archive.by_index_raw(i).ok()?;
        entries.push(EntryMeta {
            path: file.name().to_string(),
            size: file.size(),
            compressed_size: file.compressed_size(),
            encrypted: file.encrypted(),
            is_dir: file.is_dir(),
            modified: file.last_modified().and_then(convert_zip_datetime),
        });
    }
    Some(entries)
}

fn convert_zip_datetime(dt: zip::DateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32).and_then(|d| {
        d.and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
    })
}

fn to_manifest(entries: &[EntryMeta]) -> Vec<ArchiveEntry> {
    entries
        .iter()
        .filter(|e| !e.is_dir)
        .map(|e| ArchiveEntry {
            path: e.path.clone(),
            size: e.size,
            compressed_size: e.compressed_size,
            compression_ratio: compression_reduction(e.size, e.compressed_size),
            modified: e.modified,
            encrypted: e.encrypted,
            content_type: entry_content_type(&e.path),
        })
        .collect()
}

fn entry_content_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Run the gates in their fixed order; the first violation wins.
pub fn validate(
    archive_size: u64,
    entries: &[EntryMeta],
    limits: &ArchiveLimits,
) -> Result<(), ArchiveRejection> {
    check_size(archive_size, limits)?;
    check_entry_count(entries, limits)?;
    check_bomb_ratio(entries)?;
    check_paths(entries)?;
    check_name_lengths(entries)?;
    check_encryption(entries)?;
    Ok(())
}

pub fn check_size(archive_size: u64, limits: &ArchiveLimits) -> Result<(), ArchiveRejection> {
    if archive_size > limits.max_bytes {
        return Err(ArchiveRejection::TooLarge {
            size: archive_size,
            max: limits.max_bytes,
        });
    }
    Ok(())
}

/// Count only file entries; directory placeholders do not count against
/// the ceiling.
pub fn check_entry_count(
    entries: &[EntryMeta],
    limits: &ArchiveLimits,
) -> Result<(), ArchiveRejection> {
    let count = entries.iter().filter(|e| !e.is_dir).count();
    if count > limits.max_entries {
        return Err(ArchiveRejection::TooManyEntries {
            count,
            max: limits.max_entries,
        });
    }
    Ok(())
}

pub fn check_bomb_ratio(entries: &[EntryMeta]) -> Result<(), ArchiveRejection> {
    for entry in entries {
        if entry.size == 0 {
            continue;
        }
        let ratio = entry.compressed_size as f64 / entry.size as f64;
        if ratio < BOMB_RATIO_THRESHOLD {
            return Err(ArchiveRejection::SuspiciousCompression {
                path: entry.path.clone(),
                ratio,
            });
        }
    }
    Ok(())
}

pub fn check_paths(entries: &[EntryMeta]) -> Result<(), ArchiveRejection> {
    for entry in entries {
        if is_unsafe_path(&entry.path) {
            return Err(ArchiveRejection::UnsafePath {
                path: entry.path.clone(),
            });
        }
    }
    Ok(())
}

fn is_unsafe_path(path: &str) -> bool {
    path.starts_with('/') || path.split(['/', '\\']).any(|segment| segment == "..")
}

pub fn check_name_lengths(entries: &[EntryMeta]) -> Result<(), ArchiveRejection> {
    for entry in entries {
        let len = entry.path.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ArchiveRejection::NameTooLong {
                path: entry.path.clone(),
                len,
            });
        }
    }
    Ok(())
}

pub fn check_encryption(entries: &[EntryMeta]) -> Result<(), ArchiveRejection> {
    let paths: Vec<String> = entries
        .iter()
        .filter(|e| e.encrypted)
        .map(|e| e.path.clone())
        .collect();
    if paths.is_empty() {
        Ok(())
    } else {
        Err(ArchiveRejection::EncryptedEntries { paths })
    }
}
