/// Safety limits applied during archive validation.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    /// Maximum compressed archive size in bytes.
    pub max_bytes: u64,
    /// Maximum number of file entries; directory placeholders are not
    /// counted.
    pub max_entries: usize,
}

/// Entries compressed below this ratio (compressed / uncompressed) are
/// treated as potential zip bombs.
pub const BOMB_RATIO_THRESHOLD: f64 = 0.01;

/// Maximum length of an entry path in characters.
pub const MAX_NAME_LEN: usize = 255;

impl Default for ArchiveLimits {
    fn default() -> Self {
        ArchiveLimits {
            max_bytes: 100 * 1024 * 1024,
            max_entries: 1000,
        }
    }
}
