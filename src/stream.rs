//! Streaming extraction API: yield page artifacts as they complete.
//!
//! ## Why stream?
//!
//! Large batches take a while. A stream-based API lets callers show each
//! page the moment it exists — a thumbnail strip that fills in during
//! processing — or write artifacts to their own storage incrementally
//! instead of waiting for the final bundle.
//!
//! Unlike the eager [`crate::extract::extract`] which aggregates into an
//! [`crate::output::OutputBundle`], [`extract_stream`] performs no
//! aggregation at all: the caller receives every [`PageArtifact`] in file
//! and page order and decides what to keep. Dropping the stream stops the
//! pipeline at the next page boundary.

use crate::cancel::CancelToken;
use crate::config::ExtractConfig;
use crate::error::PdfPressError;
use crate::output::PageArtifact;
use crate::pipeline::{encode, input, render};
use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

/// A boxed stream of page artifacts.
pub type ArtifactStream = Pin<Box<dyn Stream<Item = Result<PageArtifact, PdfPressError>> + Send>>;

/// Extract pages as a stream, one [`PageArtifact`] per page in order.
///
/// Input collection and filtering happen eagerly, so invalid selections
/// fail here rather than inside the stream. Render and encode errors arrive
/// as `Err` items and terminate the stream.
pub async fn extract_stream(
    inputs: Vec<PathBuf>,
    config: ExtractConfig,
    cancel: CancelToken,
) -> Result<ArtifactStream, PdfPressError> {
    let collected = input::collect_inputs(&inputs)?;
    let files = collected.files;
    info!("Streaming extraction of {} file(s)", files.len());

    let (tx, rx) = mpsc::channel::<Result<PageArtifact, PdfPressError>>(4);

    tokio::spawn(async move {
        for path in files {
            if cancel.is_canceled() {
                break;
            }

            let stem = input::file_stem(&path);
            let scale = config.scale;
            let quality = config.jpeg_quality;
            let password = config.password.clone();
            let page_tx = tx.clone();
            let page_cancel = cancel.clone();

            let result = tokio::task::spawn_blocking(move || {
                render::render_file_blocking(
                    &path,
                    scale,
                    password.as_deref(),
                    &page_cancel,
                    |page| {
                        let jpeg = encode::encode_jpeg(&page.image, quality).map_err(|e| {
                            PdfPressError::EncodeFailed {
                                page: page.page_number,
                                detail: e.to_string(),
                            }
                        })?;
                        let artifact = PageArtifact::new(stem.clone(), page.page_number, jpeg);
                        if page_tx.blocking_send(Ok(artifact)).is_err() {
                            // Receiver dropped: stop at the next page boundary.
                            page_cancel.cancel();
                        }
                        Ok(())
                    },
                )
            })
            .await;

            match result {
                Ok(Ok(render::RenderStatus::Completed)) => {}
                Ok(Ok(render::RenderStatus::Canceled)) => break,
                Ok(Err(e)) => {
                    let _ = tx.send(Err(e)).await;
                    break;
                }
                Err(join) => {
                    let _ = tx
                        .send(Err(PdfPressError::Internal(format!(
                            "Render task panicked: {join}"
                        ))))
                        .await;
                    break;
                }
            }
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}
