//! Pipeline stages shared by the extractor and the compressor.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ rebuild ──▶ archive
//! (paths)  (pdfium)    (JPEG)    (lopdf,      (zip,
//!                                compressor)  multi-artifact)
//! ```
//!
//! 1. [`input`]   — expand and filter the candidate paths down to PDFs
//! 2. [`render`]  — counting pre-pass, then sequential page rasterisation;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`encode`]  — JPEG-encode each rasterised page
//! 4. [`rebuild`] — compressor only: re-embed page JPEGs into a fresh PDF
//!    of the original page geometry
//! 5. [`archive`] — collect named artifacts into an in-memory zip

pub mod archive;
pub mod encode;
pub mod input;
pub mod rebuild;
pub mod render;
