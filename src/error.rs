//! Error types for the pdfpress library.
//!
//! All failures here are **fatal**: the job cannot proceed (no usable input,
//! an unreadable document, a failed render or write). They are returned as
//! `Err(PdfPressError)` from the top-level [`crate::extract`] and
//! [`crate::compress`] functions and abort the whole run.
//!
//! Cancellation is deliberately *not* an error. A cancelled run returns
//! [`crate::output::JobOutcome::Canceled`] so callers can distinguish "the
//! user changed their mind" from "something broke".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfpress library.
#[derive(Debug, Error)]
pub enum PdfPressError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The candidate list contained no PDF files after filtering.
    #[error("No PDF files in the selection.\nOnly files ending in .pdf (case-insensitive) are accepted.")]
    EmptySelection,

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error while rasterising a specific page.
    #[error("Rasterisation failed for page {page} of '{file}': {detail}")]
    RenderFailed {
        file: String,
        page: usize,
        detail: String,
    },

    // ── Encoding / writing errors ─────────────────────────────────────────
    /// JPEG encoding of a rendered page failed.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The rebuilt output PDF could not be serialised.
    #[error("Failed to write rebuilt PDF for '{file}': {detail}")]
    PdfWriteFailed { file: String, detail: String },

    /// The zip archive could not be assembled.
    #[error("Failed to build zip archive: {0}")]
    ArchiveFailed(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Policy errors ─────────────────────────────────────────────────────
    /// Multi-file compression was requested on a constrained device profile.
    #[error(
        "Compressing {count} files at once is not supported on a constrained device.\n\
Process files one at a time, or run without --constrained."
    )]
    MultiFileNotSupported { count: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy, or place\n\
libpdfium next to the executable.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
