//! # pdfpress
//!
//! Two PDF utilities behind one pipeline: extract every page as a JPEG, or
//! shrink a document by rasterising its pages at a lower resolution and
//! re-embedding them.
//!
//! ## Why this crate?
//!
//! Both tools are deliberate *glue*: pdfium does the rendering, lopdf the
//! PDF writing, the `zip` crate the archiving. What this crate adds is the
//! contract around them — case-insensitive input filtering, a counting
//! pre-pass so the output shape and progress totals are fixed before any
//! pixel work, strictly sequential page processing with cooperative
//! cancellation at page boundaries, quality presets with a constrained-
//! device cap, and single-artifact vs. zip output shaping.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs
//!  │
//!  ├─ 1. Input    expand paths, keep *.pdf, verify %PDF magic
//!  ├─ 2. Count    open every document, fix totals and bundle shape
//!  ├─ 3. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Encode   page pixels → JPEG
//!  │              └─ compress: re-embed full-bleed into a fresh PDF page
//!  │                 of the original geometry (lopdf)
//!  └─ 5. Bundle   single artifact, or zip of all artifacts
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfpress::{extract, ExtractConfig, JobOutcome};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default();
//!     let outcome = extract(&[PathBuf::from("document.pdf")], &config).await?;
//!     if let JobOutcome::Completed { bundle, stats } = outcome {
//!         eprintln!("{} pages → {}", stats.processed_pages, bundle.name());
//!         bundle.write_to_dir(".").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfpress` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfpress = { version = "0.3", default-features = false }
//! ```
//!
//! ## Choosing a Preset (compressor)
//!
//! | Preset | DPI | JPEG quality | Best for |
//! |--------|-----|--------------|----------|
//! | `min`    | 72  | 0.4 | Smallest output |
//! | `mobile` | 96  | 0.5 | Reading on phones |
//! | `pc`     | 144 | 0.6 | Default — screens |
//! | `print`  | 200 | 0.8 | Printing |
//! | `pc-hi`  | 300 | 0.8 | Archival detail (standard devices only) |
//!
//! On a constrained device profile anything above 144 DPI is silently
//! forced down to the `pc` settings.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod compress;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::CancelToken;
pub use compress::{compress, compress_from_bytes, compress_with};
pub use config::{
    CompressConfig, CompressConfigBuilder, DeviceProfile, ExtractConfig, ExtractConfigBuilder,
    QualityPreset, RenderSettings, EXTRACT_SCALE,
};
pub use error::PdfPressError;
pub use extract::{extract, extract_from_bytes, extract_with};
pub use output::{BundleMode, JobOutcome, JobStats, OutputBundle, PageArtifact};
pub use progress::{JobState, NoopProgress, Progress, ProgressCallback, ProgressTracker};
pub use stream::{extract_stream, ArtifactStream};
