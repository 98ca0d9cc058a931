//! Output types: page artifacts, bundles, job outcomes, and stats.
//!
//! The single-vs-archive decision is made exactly once, by
//! [`BundleMode::for_extract`] / [`BundleMode::for_compress`], from counts
//! established during the pre-pass — before any page is processed. The
//! aggregation step consumes the decision; nothing else branches on it.

use crate::error::PdfPressError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archive name used when the extractor bundles multiple JPEGs.
pub const EXTRACT_ARCHIVE_NAME: &str = "converted.zip";

/// Archive name used when the compressor bundles multiple PDFs.
pub const COMPRESS_ARCHIVE_NAME: &str = "compressed_pdfs.zip";

/// One JPEG-encoded page produced by the extractor.
#[derive(Debug, Clone)]
pub struct PageArtifact {
    /// Source file name with the `.pdf` suffix stripped.
    pub file_stem: String,
    /// 1-based page number within the source file.
    pub page_number: usize,
    /// JPEG bytes.
    pub data: Vec<u8>,
}

impl PageArtifact {
    pub fn new(file_stem: impl Into<String>, page_number: usize, data: Vec<u8>) -> Self {
        Self {
            file_stem: file_stem.into(),
            page_number,
            data,
        }
    }

    /// Derived artifact filename: `{stem}_{page:03}.jpg`.
    pub fn file_name(&self) -> String {
        format!("{}_{:03}.jpg", self.file_stem, self.page_number)
    }

    /// Caption for a thumbnail of this page: `{stem}.pdf - p.{page}`.
    pub fn caption(&self) -> String {
        format!("{}.pdf - p.{}", self.file_stem, self.page_number)
    }

    /// Browser-displayable `data:` URL for thumbnail previews.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.data))
    }
}

/// Derived output name for a compressed PDF: `{stem}_compressed.pdf`.
pub fn compressed_pdf_name(file_stem: &str) -> String {
    format!("{file_stem}_compressed.pdf")
}

// ── Bundle shaping ───────────────────────────────────────────────────────

/// Whether the job's output is one direct artifact or a zip archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleMode {
    /// Exactly one artifact; downloaded as-is.
    Direct,
    /// Multiple artifacts collected into a zip.
    Archive,
}

impl BundleMode {
    /// Extractor rule: direct only when one file contributes one page in
    /// total; every other combination produces a zip of per-page JPEGs.
    pub fn for_extract(file_count: usize, total_pages: usize) -> Self {
        if file_count == 1 && total_pages == 1 {
            BundleMode::Direct
        } else {
            BundleMode::Archive
        }
    }

    /// Compressor rule: one input file means one direct PDF, regardless of
    /// its page count — a document is one artifact. Multiple files zip.
    pub fn for_compress(file_count: usize) -> Self {
        if file_count == 1 {
            BundleMode::Direct
        } else {
            BundleMode::Archive
        }
    }
}

/// The downloadable result of a completed job.
#[derive(Debug, Clone)]
pub enum OutputBundle {
    /// A single artifact, served under its derived name.
    Single {
        name: String,
        mime: &'static str,
        bytes: Vec<u8>,
    },
    /// A zip archive of all artifacts.
    Zip { name: String, bytes: Vec<u8> },
}

impl OutputBundle {
    /// The download filename for this bundle.
    pub fn name(&self) -> &str {
        match self {
            OutputBundle::Single { name, .. } => name,
            OutputBundle::Zip { name, .. } => name,
        }
    }

    /// The bundle's payload bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            OutputBundle::Single { bytes, .. } => bytes,
            OutputBundle::Zip { bytes, .. } => bytes,
        }
    }

    /// Write the bundle into `dir` under its own name.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PdfPressError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PdfPressError::OutputWriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let path = dir.join(self.name());
        let tmp_path = path.with_extension("part");
        tokio::fs::write(&tmp_path, self.bytes())
            .await
            .map_err(|e| PdfPressError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| PdfPressError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        Ok(path)
    }
}

// ── Outcome & stats ──────────────────────────────────────────────────────

/// Result of one pipeline invocation.
///
/// Cancellation is a normal outcome, not an error: already-completed page
/// artifacts are discarded and only the count survives.
#[derive(Debug)]
pub enum JobOutcome {
    /// Every page of every file was processed.
    Completed {
        bundle: OutputBundle,
        stats: JobStats,
    },
    /// The cancel flag was observed at a page boundary.
    Canceled { processed_pages: usize },
}

impl JobOutcome {
    /// The bundle, if the job ran to completion.
    pub fn bundle(&self) -> Option<&OutputBundle> {
        match self {
            JobOutcome::Completed { bundle, .. } => Some(bundle),
            JobOutcome::Canceled { .. } => None,
        }
    }
}

/// Timing and volume numbers for a completed job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStats {
    /// Input files processed.
    pub files: usize,
    /// Page total established by the counting pre-pass.
    pub total_pages: usize,
    /// Pages whose artifacts were produced. Equals `total_pages` on a
    /// completed run.
    pub processed_pages: usize,
    /// Wall-clock time spent rasterising and encoding pages.
    pub render_duration_ms: u64,
    /// Whole-job wall-clock time including aggregation.
    pub total_duration_ms: u64,
    /// Size of the final bundle in bytes.
    pub output_bytes: usize,
}
