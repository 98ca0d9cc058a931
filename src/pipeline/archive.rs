//! Archive assembly: named artifacts → one in-memory zip.
//!
//! Artifacts accumulate in memory for the lifetime of one invocation and
//! the archive is serialised in one pass at the end — there is no streaming
//! to disk, which bounds the tool to inputs that fit in memory alongside
//! their outputs.

use crate::error::PdfPressError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Serialise `(name, bytes)` entries into a zip archive.
///
/// Entry order is preserved. JPEG and rebuilt-PDF payloads are already
/// compressed, but Deflate is kept for parity with what download tools
/// expect from a `.zip`.
pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, PdfPressError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| PdfPressError::ArchiveFailed(format!("entry '{name}': {e}")))?;
        writer
            .write_all(bytes)
            .map_err(|e| PdfPressError::ArchiveFailed(format!("entry '{name}': {e}")))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| PdfPressError::ArchiveFailed(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn round_trips_entries_in_order() {
        let entries = vec![
            ("a_001.jpg".to_string(), vec![1u8, 2, 3]),
            ("a_002.jpg".to_string(), vec![4u8, 5]),
            ("b_001.jpg".to_string(), vec![6u8]),
        ];
        let bytes = build_zip(&entries).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        for (i, (name, payload)) in entries.iter().enumerate() {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.name(), name);
            let mut read_back = Vec::new();
            entry.read_to_end(&mut read_back).unwrap();
            assert_eq!(&read_back, payload);
        }
    }

    #[test]
    fn empty_archive_is_valid() {
        let bytes = build_zip(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
