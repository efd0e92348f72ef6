//! Upload payload fixtures.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A minimal PDF header; enough for content-type checks.
pub fn minimal_pdf() -> Vec<u8> {
    b"%PDF-1.4\n%%EOF\n".to_vec()
}

/// Build a stored (uncompressed) zip from `(name, contents)` pairs.
/// Names ending in `/` become directory entries.
pub fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(name.trim_end_matches('/'), options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// A deflated megabyte of zeros: compresses far below the ratio floor.
pub fn bomb_zip() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("zeros.bin", options).unwrap();
    writer.write_all(&vec![0u8; 1024 * 1024]).unwrap();
    writer.finish().unwrap().into_inner()
}

/// A zip whose single entry climbs out of the extraction root.
pub fn traversal_zip() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("../evil.txt", options).unwrap();
    writer.write_all(b"payload").unwrap();
    writer.finish().unwrap().into_inner()
}
