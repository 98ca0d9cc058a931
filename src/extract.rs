//! Page-extraction pipeline: every page of every input becomes a JPEG.
//!
//! One sequential pass per invocation: counting pre-pass, then per file in
//! input order, per page in ascending order, render → encode → record. The
//! cancel token is polled before every page render; a cancelled run
//! discards all accumulated artifacts and reports how many pages had
//! completed. Output shaping (direct JPEG vs. zip) is decided once, from
//! the counts, before the first pixel is rendered.

use crate::cancel::CancelToken;
use crate::config::ExtractConfig;
use crate::error::PdfPressError;
use crate::output::{
    BundleMode, JobOutcome, JobStats, OutputBundle, PageArtifact, EXTRACT_ARCHIVE_NAME,
};
use crate::pipeline::{archive, encode, input, render};
use crate::progress::{NoopProgress, Progress, ProgressTracker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract every page of the given PDFs as JPEGs.
///
/// Convenience wrapper over [`extract_with`] with a fresh cancel token and
/// no progress reporting.
pub async fn extract(
    inputs: &[PathBuf],
    config: &ExtractConfig,
) -> Result<JobOutcome, PdfPressError> {
    extract_with(inputs, config, CancelToken::new(), Arc::new(NoopProgress)).await
}

/// Extract every page of the given PDFs as JPEGs, with cooperative
/// cancellation and progress callbacks.
///
/// # Returns
/// - `Ok(JobOutcome::Completed)` with a single JPEG (one file, one page) or
///   a `converted.zip` bundle otherwise
/// - `Ok(JobOutcome::Canceled)` if the token was set; partial artifacts are
///   discarded
///
/// # Errors
/// Any failure to collect input, open a document, render a page, encode a
/// JPEG, or assemble the archive aborts the whole run.
pub async fn extract_with(
    inputs: &[PathBuf],
    config: &ExtractConfig,
    cancel: CancelToken,
    progress: Progress,
) -> Result<JobOutcome, PdfPressError> {
    let total_start = Instant::now();

    // ── Step 1: Collect and validate input ───────────────────────────────
    let collected = input::collect_inputs(inputs)?;
    let files = collected.files;

    // ── Step 2: Counting pre-pass ────────────────────────────────────────
    let page_counts = render::count_pages(&files, config.password.clone()).await?;
    let total_pages: usize = page_counts.iter().sum();
    info!("Extracting {} pages from {} file(s)", total_pages, files.len());

    let mode = BundleMode::for_extract(files.len(), total_pages);
    debug!("Bundle mode fixed before processing: {mode:?}");

    progress.on_job_start(total_pages, files.len());
    let mut tracker = ProgressTracker::new();
    tracker.begin(total_pages);

    // ── Step 3: Render and encode, file by file, page by page ────────────
    let render_start = Instant::now();
    let mut artifacts: Vec<PageArtifact> = Vec::with_capacity(total_pages);

    for (path, file_pages) in files.iter().zip(page_counts) {
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
        let scale = config.scale;
        let quality = config.jpeg_quality;
        let password = config.password.clone();
        let file_cancel = cancel.clone();
        let file_progress = Arc::clone(&progress);
        let mut file_tracker = tracker;

        let (file_artifacts, returned_tracker, status) =
            tokio::task::spawn_blocking(move || {
                let mut out: Vec<PageArtifact> = Vec::new();
                let status = render::render_file_blocking(
                    &file_path,
                    scale,
                    password.as_deref(),
                    &file_cancel,
                    |page| {
                        file_progress.on_page_start(&file_name, page.page_number, file_pages);
                        let jpeg = encode::encode_jpeg(&page.image, quality).map_err(|e| {
                            PdfPressError::EncodeFailed {
                                page: page.page_number,
                                detail: e.to_string(),
                            }
                        })?;
                        let artifact = PageArtifact::new(stem.clone(), page.page_number, jpeg);
                        let percent = file_tracker.page_done();
                        file_progress.on_page_complete(
                            &artifact,
                            file_tracker.processed(),
                            file_tracker.total(),
                            percent,
                        );
                        out.push(artifact);
                        Ok(())
                    },
                )?;
                Ok::<_, PdfPressError>((out, file_tracker, status))
            })
            .await
            .map_err(|e| PdfPressError::Internal(format!("Render task panicked: {e}")))??;

        tracker = returned_tracker;

        if status == render::RenderStatus::Canceled {
            tracker.cancel();
            progress.on_job_canceled(tracker.processed());
            return Ok(JobOutcome::Canceled {
                processed_pages: tracker.processed(),
            });
        }

        artifacts.extend(file_artifacts);
        progress.on_file_complete(&input::display_name(path));
    }
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 4: Aggregate ────────────────────────────────────────────────
    let bundle = match mode {
        BundleMode::Direct => {
            let artifact = artifacts
                .into_iter()
                .next()
                .ok_or_else(|| PdfPressError::Internal("no artifact for direct bundle".into()))?;
            OutputBundle::Single {
                name: artifact.file_name(),
                mime: "image/jpeg",
                bytes: artifact.data,
            }
        }
        BundleMode::Archive => {
            let entries: Vec<(String, Vec<u8>)> = artifacts
                .into_iter()
                .map(|a| {
                    let name = a.file_name();
                    (name, a.data)
                })
                .collect();
            OutputBundle::Zip {
                name: EXTRACT_ARCHIVE_NAME.to_string(),
                bytes: archive::build_zip(&entries)?,
            }
        }
    };

    tracker.complete();
    let stats = JobStats {
        files: files.len(),
        total_pages,
        processed_pages: tracker.processed(),
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        output_bytes: bundle.bytes().len(),
    };
    info!(
        "Extraction complete: {}/{} pages, {} bytes, {}ms",
        stats.processed_pages, stats.total_pages, stats.output_bytes, stats.total_duration_ms
    );
    progress.on_job_complete(stats.processed_pages, stats.total_pages);

    Ok(JobOutcome::Completed { bundle, stats })
}

/// Extract pages from PDF bytes held in memory.
///
/// `name` supplies the artifact stem a byte buffer otherwise lacks
/// (`{name}_001.jpg` etc.). The bytes are written to a managed temp
/// directory for the renderer — pdfium needs a file-system path — and
/// cleaned up on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    name: &str,
    config: &ExtractConfig,
) -> Result<JobOutcome, PdfPressError> {
    let dir = tempfile::tempdir().map_err(|e| PdfPressError::Internal(format!("tempdir: {e}")))?;
    let path = dir.path().join(format!("{name}.pdf"));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| PdfPressError::Internal(format!("temp write: {e}")))?;
    // `dir` lives until this returns, so the file survives the whole run.
    extract(&[path], config).await
}
