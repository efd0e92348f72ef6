//! Centralized key generation and content-type resolution.

use std::path::Path;

use uuid::Uuid;

/// Generate a storage key for an uploaded file: `jobs/{uuid}{ext}`.
/// The extension is taken from the original filename, lowercased; files
/// without an extension get a bare uuid key.
pub fn generate_object_key(original_filename: &str) -> String {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    format!("jobs/{}{}", Uuid::new_v4(), ext)
}

/// Resolve the content type to store: explicit value if present and
/// non-empty, then a guess from the filename extension, then
/// `application/octet-stream`.
pub fn resolve_content_type(explicit: Option<&str>, filename: &str) -> String {
    if let Some(ct) = explicit {
        if !ct.trim().is_empty() {
            return ct.to_string();
        }
    }
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_keeps_extension() {
        let key = generate_object_key("Report.PDF");
        assert!(key.starts_with("jobs/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_generate_key_without_extension() {
        let key = generate_object_key("README");
        assert!(key.starts_with("jobs/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_generated_keys_are_unique() {
        assert_ne!(generate_object_key("a.txt"), generate_object_key("a.txt"));
    }

    #[test]
    fn test_resolve_content_type_prefers_explicit() {
        assert_eq!(
            resolve_content_type(Some("application/pdf"), "file.txt"),
            "application/pdf"
        );
    }

    #[test]
    fn test_resolve_content_type_guesses_from_extension() {
        assert_eq!(resolve_content_type(None, "file.txt"), "text/plain");
        assert_eq!(resolve_content_type(Some("  "), "file.json"), "application/json");
    }

    #[test]
    fn test_resolve_content_type_falls_back_to_octet_stream() {
        assert_eq!(
            resolve_content_type(None, "mystery.qqq"),
            "application/octet-stream"
        );
    }
}
