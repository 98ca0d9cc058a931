//! PDF rasterisation: counting pre-pass and sequential per-page rendering.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread designed for blocking operations, preventing the
//! Tokio worker threads from stalling during CPU-heavy rendering.
//!
//! ## Why a counting pass?
//!
//! The single-vs-archive output decision and exact progress percentages
//! both need the page total before any pixel work starts. Opening every
//! document once up front is cheap relative to rendering and keeps the
//! decision out of the page loop entirely.

use crate::cancel::CancelToken;
use crate::error::PdfPressError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One rasterised page, alive only for the duration of a sink call.
pub struct RenderedPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Source page width in points, at scale 1.0.
    pub width_pts: f32,
    /// Source page height in points, at scale 1.0.
    pub height_pts: f32,
    /// Pixel buffer at the requested scale.
    pub image: DynamicImage,
}

/// Whether a per-file render loop ran to the end or stopped cooperatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Completed,
    Canceled,
}

/// Bind to a pdfium library: alongside the executable first, then the
/// system library.
fn bind_pdfium() -> Result<Pdfium, PdfPressError> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| PdfPressError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Map a pdfium document-load failure to a structured error.
fn map_load_error(e: PdfiumError, path: &Path, password: Option<&str>) -> PdfPressError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            PdfPressError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            PdfPressError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        PdfPressError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Open every file once and return its page count, in input order.
///
/// This is the counting pre-pass; it performs no pixel work.
pub async fn count_pages(
    files: &[std::path::PathBuf],
    password: Option<String>,
) -> Result<Vec<usize>, PdfPressError> {
    let files = files.to_vec();
    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let mut counts = Vec::with_capacity(files.len());
        for path in &files {
            let document = pdfium
                .load_pdf_from_file(path, password.as_deref())
                .map_err(|e| map_load_error(e, path, password.as_deref()))?;
            counts.push(document.pages().len() as usize);
        }
        Ok(counts)
    })
    .await
    .map_err(|e| PdfPressError::Internal(format!("Counting task panicked: {e}")))?
}

/// Render every page of one document in ascending order, feeding each
/// [`RenderedPage`] to `sink` before the next page starts.
///
/// The cancel token is polled immediately before each page's render; once a
/// render begins it always completes. Runs on the calling (blocking)
/// thread — callers wrap this in `spawn_blocking`.
pub fn render_file_blocking<F>(
    path: &Path,
    scale: f32,
    password: Option<&str>,
    cancel: &CancelToken,
    mut sink: F,
) -> Result<RenderStatus, PdfPressError>
where
    F: FnMut(RenderedPage) -> Result<(), PdfPressError>,
{
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(path, password)
        .map_err(|e| map_load_error(e, path, password))?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    let file_name = crate::pipeline::input::display_name(path);
    info!("Rendering '{}': {} pages at {:.2}x", file_name, page_count, scale);

    for index in 0..page_count {
        if cancel.is_canceled() {
            info!("Cancellation observed before page {} of '{}'", index + 1, file_name);
            return Ok(RenderStatus::Canceled);
        }

        let page = pages
            .get(index as u16)
            .map_err(|e| PdfPressError::RenderFailed {
                file: file_name.clone(),
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        let width_pts = page.width().value;
        let height_pts = page.height().value;
        let px_w = ((width_pts * scale).round() as i32).max(1);
        let px_h = ((height_pts * scale).round() as i32).max(1);

        let render_config = PdfRenderConfig::new()
            .set_target_width(px_w)
            .set_target_height(px_h);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| PdfPressError::RenderFailed {
                file: file_name.clone(),
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {}/{} of '{}' → {}x{} px",
            index + 1,
            page_count,
            file_name,
            image.width(),
            image.height()
        );

        sink(RenderedPage {
            page_number: index + 1,
            width_pts,
            height_pts,
            image,
        })?;
        // The pixel buffer was moved into the sink and dropped there;
        // nothing from this page survives into the next iteration.
    }

    Ok(RenderStatus::Completed)
}
