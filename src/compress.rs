//! Compression pipeline: rasterise each page and re-embed it at lower DPI.
//!
//! One output document per input file: every source page is rendered at the
//! preset's `dpi / 72` scale, JPEG-encoded at the preset's quality, and
//! drawn full-bleed onto a fresh page of the *original* page geometry. The
//! rebuilt documents are either downloaded directly (one input file) or
//! zipped (several). A document is one artifact regardless of its page
//! count, so there is no single-page special case here.
//!
//! Constrained devices refuse multi-file runs before any work starts, and
//! multi-file runs pause briefly between documents so interactive hosts can
//! repaint.

use crate::cancel::CancelToken;
use crate::config::CompressConfig;
use crate::error::PdfPressError;
use crate::output::{
    compressed_pdf_name, BundleMode, JobOutcome, JobStats, OutputBundle, PageArtifact,
    COMPRESS_ARCHIVE_NAME,
};
use crate::pipeline::{archive, encode, input, rebuild, render};
use crate::progress::{NoopProgress, Progress, ProgressTracker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Compress the given PDFs by rasterising pages at the preset's DPI.
///
/// Convenience wrapper over [`compress_with`] with a fresh cancel token and
/// no progress reporting.
pub async fn compress(
    inputs: &[PathBuf],
    config: &CompressConfig,
) -> Result<JobOutcome, PdfPressError> {
    compress_with(inputs, config, CancelToken::new(), Arc::new(NoopProgress)).await
}

/// Compress the given PDFs, with cooperative cancellation and progress
/// callbacks.
///
/// # Returns
/// - `Ok(JobOutcome::Completed)` with a single `{stem}_compressed.pdf`
///   (one input file) or a `compressed_pdfs.zip` bundle
/// - `Ok(JobOutcome::Canceled)` if the token was set; partial output is
///   discarded
///
/// # Errors
/// - [`PdfPressError::MultiFileNotSupported`] for multi-file input on a
///   constrained device profile, before any processing
/// - any document-open, render, encode, or write failure aborts the run
pub async fn compress_with(
    inputs: &[PathBuf],
    config: &CompressConfig,
    cancel: CancelToken,
    progress: Progress,
) -> Result<JobOutcome, PdfPressError> {
    let total_start = Instant::now();

    // ── Step 1: Collect and validate input ───────────────────────────────
    let collected = input::collect_inputs(inputs)?;
    let files = collected.files;

    if config.device == crate::config::DeviceProfile::Constrained && files.len() > 1 {
        return Err(PdfPressError::MultiFileNotSupported { count: files.len() });
    }

    // ── Step 2: Resolve settings once ────────────────────────────────────
    let settings = config.render_settings();
    let scale = settings.scale();
    let quality = settings.jpeg_quality_percent();
    info!(
        "Compressing {} file(s) at {} dpi (scale {:.2}, quality {})",
        files.len(),
        settings.dpi,
        scale,
        quality
    );

    // ── Step 3: Counting pre-pass ────────────────────────────────────────
    let page_counts = render::count_pages(&files, config.password.clone()).await?;
    let total_pages: usize = page_counts.iter().sum();

    let mode = BundleMode::for_compress(files.len());
    debug!("Bundle mode fixed before processing: {mode:?}");

    progress.on_job_start(total_pages, files.len());
    let mut tracker = ProgressTracker::new();
    tracker.begin(total_pages);

    // ── Step 4: Rebuild each document ────────────────────────────────────
    let render_start = Instant::now();
    let mut outputs: Vec<(String, Vec<u8>)> = Vec::with_capacity(files.len());
    let file_count = files.len();

    for (file_index, (path, file_pages)) in files.iter().zip(page_counts).enumerate() {
        if cancel.is_canceled() {
            tracker.cancel();
            progress.on_job_canceled(tracker.processed());
            return Ok(JobOutcome::Canceled {
                processed_pages: tracker.processed(),
            });
        }

        let file_path = path.clone();
        let stem = input::file_stem(path);
        let file_name = input::display_name(path);
        let password = config.password.clone();
        let file_cancel = cancel.clone();
        let file_progress = Arc::clone(&progress);
        let mut file_tracker = tracker;
        let output_name = compressed_pdf_name(&stem);

        let (rebuilt, returned_tracker, status) = tokio::task::spawn_blocking(move || {
            let mut builder = rebuild::PdfRebuilder::new(file_name.clone());
            let status = render::render_file_blocking(
                &file_path,
                scale,
                password.as_deref(),
                &file_cancel,
                |page| {
                    file_progress.on_page_start(&file_name, page.page_number, file_pages);
                    let jpeg =
                        encode::encode_jpeg(&page.image, Some(quality)).map_err(|e| {
                            PdfPressError::EncodeFailed {
                                page: page.page_number,
                                detail: e.to_string(),
                            }
                        })?;
                    let artifact = PageArtifact::new(stem.clone(), page.page_number, jpeg);
                    builder.add_jpeg_page(
                        page.width_pts,
                        page.height_pts,
                        page.image.width(),
                        page.image.height(),
                        &artifact.data,
                    )?;
                    let percent = file_tracker.page_done();
                    file_progress.on_page_complete(
                        &artifact,
                        file_tracker.processed(),
                        file_tracker.total(),
                        percent,
                    );
                    // Raster buffer and page JPEG are both dropped here;
                    // only the growing output document is retained.
                    Ok(())
                },
            )?;
            let bytes = match status {
                render::RenderStatus::Completed => Some(builder.finish()?),
                render::RenderStatus::Canceled => None,
            };
            Ok::<_, PdfPressError>((bytes, file_tracker, status))
        })
        .await
        .map_err(|e| PdfPressError::Internal(format!("Compress task panicked: {e}")))??;

        tracker = returned_tracker;

        if status == render::RenderStatus::Canceled {
            tracker.cancel();
            progress.on_job_canceled(tracker.processed());
            return Ok(JobOutcome::Canceled {
                processed_pages: tracker.processed(),
            });
        }

        let bytes =
            rebuilt.ok_or_else(|| PdfPressError::Internal("missing rebuilt document".into()))?;
        debug!("Rebuilt '{}' → {} bytes", output_name, bytes.len());
        outputs.push((output_name, bytes));
        progress.on_file_complete(&input::display_name(path));

        // Breather between documents so interactive hosts can repaint.
        let last = file_index + 1 == file_count;
        if !last && config.inter_file_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.inter_file_delay_ms)).await;
        }
    }
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 5: Aggregate ────────────────────────────────────────────────
    let bundle = match mode {
        BundleMode::Direct => {
            let (name, bytes) = outputs
                .into_iter()
                .next()
                .ok_or_else(|| PdfPressError::Internal("no output for direct bundle".into()))?;
            OutputBundle::Single {
                name,
                mime: "application/pdf",
                bytes,
            }
        }
        BundleMode::Archive => OutputBundle::Zip {
            name: COMPRESS_ARCHIVE_NAME.to_string(),
            bytes: archive::build_zip(&outputs)?,
        },
    };

    tracker.complete();
    let stats = JobStats {
        files: file_count,
        total_pages,
        processed_pages: tracker.processed(),
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        output_bytes: bundle.bytes().len(),
    };
    info!(
        "Compression complete: {}/{} pages, {} bytes, {}ms",
        stats.processed_pages, stats.total_pages, stats.output_bytes, stats.total_duration_ms
    );
    progress.on_job_complete(stats.processed_pages, stats.total_pages);

    Ok(JobOutcome::Completed { bundle, stats })
}

/// Compress PDF bytes held in memory.
///
/// `name` supplies the output stem (`{name}_compressed.pdf`). The bytes are
/// written to a managed temp directory for the renderer and cleaned up on
/// return.
pub async fn compress_from_bytes(
    bytes: &[u8],
    name: &str,
    config: &CompressConfig,
) -> Result<JobOutcome, PdfPressError> {
    let dir = tempfile::tempdir().map_err(|e| PdfPressError::Internal(format!("tempdir: {e}")))?;
    let path = dir.path().join(format!("{name}.pdf"));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| PdfPressError::Internal(format!("temp write: {e}")))?;
    compress(&[path], config).await
}
