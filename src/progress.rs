//! Progress reporting: per-page callbacks and the job state machine.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a GUI thumbnail strip, or
//! a log — without the library knowing anything about how the host
//! application presents them. The trait is `Send + Sync` because the page
//! loop runs inside `spawn_blocking` on another thread.
//!
//! [`ProgressTracker`] holds the `(processed, total)` counters and the
//! `Idle → Running → {Completed, Canceled}` state machine. The processed
//! count increments only after a page's artifact is fully produced, so the
//! displayed percentage never claims work that has not finished.

use crate::output::PageArtifact;
use std::sync::Arc;

/// Called by the pipelines as they process each page and file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Artifact references passed to
/// [`on_page_complete`](Self::on_page_complete) are delivered incrementally,
/// while the run is still in flight — this is the hook for live thumbnail
/// previews.
pub trait ProgressCallback: Send + Sync {
    /// Called once after the counting pre-pass, before any page is rendered.
    fn on_job_start(&self, total_pages: usize, total_files: usize) {
        let _ = (total_pages, total_files);
    }

    /// Called just before a page render begins.
    fn on_page_start(&self, file_name: &str, page_num: usize, file_pages: usize) {
        let _ = (file_name, page_num, file_pages);
    }

    /// Called when a page's artifact has been fully produced.
    ///
    /// `percent` is `floor(processed / total × 100)` and is monotonically
    /// non-decreasing across the run.
    fn on_page_complete(&self, artifact: &PageArtifact, processed: usize, total: usize, percent: u8) {
        let _ = (artifact, processed, total, percent);
    }

    /// Called when all pages of one input file have been processed
    /// (compressor: the rebuilt document is complete).
    fn on_file_complete(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called once when the whole job completes without cancellation.
    fn on_job_complete(&self, processed: usize, total: usize) {
        let _ = (processed, total);
    }

    /// Called once if the job stops at a page boundary due to cancellation.
    fn on_job_canceled(&self, processed: usize) {
        let _ = processed;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {}

/// Convenience alias for the shared callback handle the pipelines accept.
pub type Progress = Arc<dyn ProgressCallback>;

// ── Job state machine ────────────────────────────────────────────────────

/// Lifecycle of one job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    /// No job running; counters are zero.
    #[default]
    Idle,
    /// Counting pass done, pages being processed.
    Running,
    /// All pages processed, bundle produced.
    Completed,
    /// Stopped at a page boundary; partial artifacts discarded.
    Canceled,
}

/// `(processed, total)` counters plus the job state.
///
/// `percent()` only ever grows within a run and reaches 100 exactly when
/// the last page of the last file has completed.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: JobState,
    processed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Idle → Running` with the total established by the counting pass.
    pub fn begin(&mut self, total_pages: usize) {
        debug_assert_eq!(self.state, JobState::Idle);
        self.state = JobState::Running;
        self.processed = 0;
        self.total = total_pages;
    }

    /// Record one completed page artifact and return the new percentage.
    pub fn page_done(&mut self) -> u8 {
        debug_assert_eq!(self.state, JobState::Running);
        self.processed += 1;
        self.percent()
    }

    /// Integer percentage, `floor(processed / total × 100)`.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.processed * 100) / self.total) as u8
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// `Running → Completed`.
    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Completed;
    }

    /// `Running → Canceled`.
    pub fn cancel(&mut self) {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Canceled;
    }

    /// `Completed/Canceled → Idle`: explicit reset, counters zeroed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
