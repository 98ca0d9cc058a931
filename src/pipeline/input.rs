//! Input collection: expand candidate paths to a validated list of PDFs.
//!
//! Candidates come from explicit file paths or from directories (walked
//! recursively, the folder-picker case). The filter keeps only names ending
//! in `.pdf`, case-insensitive; everything else is counted as skipped so the
//! caller can warn and proceed. Each surviving file is then opened and its
//! `%PDF` magic bytes checked before any rendering starts, so callers get a
//! meaningful error rather than a pdfium failure mid-run.

use crate::error::PdfPressError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static RE_PDF_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").unwrap());

/// The filtered, validated input set for one job.
#[derive(Debug)]
pub struct CollectedInput {
    /// Accepted PDF files, in input order (directory entries sorted by name).
    pub files: Vec<PathBuf>,
    /// Candidates dropped by the `.pdf` filter.
    pub skipped: usize,
}

/// True if the file name carries a `.pdf` suffix, case-insensitive.
pub fn is_pdf_name(name: &str) -> bool {
    RE_PDF_SUFFIX.is_match(name)
}

/// File name with the `.pdf` suffix stripped; used to derive artifact names.
pub fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    RE_PDF_SUFFIX.replace(&name, "").into_owned()
}

/// File name component of a path, for progress display.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand, filter, and validate the candidate paths.
///
/// # Errors
/// - [`PdfPressError::EmptySelection`] if nothing survives the filter
/// - [`PdfPressError::FileNotFound`] / [`PdfPressError::PermissionDenied`]
///   for unreadable explicit paths
/// - [`PdfPressError::NotAPdf`] if a kept file fails the magic-byte check
pub fn collect_inputs(paths: &[PathBuf]) -> Result<CollectedInput, PdfPressError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut candidates)?;
        } else {
            candidates.push(path.clone());
        }
    }

    let total = candidates.len();
    let files: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|p| is_pdf_name(&display_name(p)))
        .collect();
    let skipped = total - files.len();

    if skipped > 0 {
        warn!("Ignoring {skipped} non-PDF candidate(s)");
    }
    if files.is_empty() {
        return Err(PdfPressError::EmptySelection);
    }

    for file in &files {
        validate_pdf_magic(file)?;
    }

    debug!("Collected {} PDF file(s)", files.len());
    Ok(CollectedInput { files, skipped })
}

/// Recursively collect regular files under `dir`, sorted by name per level
/// so runs are deterministic across platforms.
fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), PdfPressError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| map_io_error(e, dir))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            walk_dir(&entry, out)?;
        } else {
            out.push(entry);
        }
    }
    Ok(())
}

/// Verify the file opens and starts with the `%PDF` magic bytes.
fn validate_pdf_magic(path: &Path) -> Result<(), PdfPressError> {
    use std::io::Read;

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => Ok(()),
                Ok(()) => Err(PdfPressError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                }),
                // Shorter than 4 bytes cannot be a PDF either.
                Err(_) => Err(PdfPressError::NotAPdf {
                    path: path.to_path_buf(),
                    magic: [0; 4],
                }),
            }
        }
        Err(e) => Err(map_io_error(e, path)),
    }
}

fn map_io_error(e: std::io::Error, path: &Path) -> PdfPressError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        PdfPressError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        PdfPressError::FileNotFound {
            path: path.to_path_buf(),
        }
    }
}
