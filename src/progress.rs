//! Progress-callback trait for stage and chapter events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from stage to stage and writes each chapter.
//! The `tex2md` binary uses this to drive an `indicatif` progress bar; a
//! library caller can forward the events anywhere else.
//!
//! # Example
//!
//! ```rust
//! use lkmpg_tex2md::{ConversionProgressCallback, ConversionConfig, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_chapter_written(&self, index: usize, total: usize, _path: &std::path::Path) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("chapter {}/{} written", index + 1, total);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Preprocess,
    Convert,
    Postprocess,
    Split,
    Cleanup,
}

impl Stage {
    /// All stages in the order the pipeline runs them.
    pub const ALL: [Stage; 6] = [
        Stage::Fetch,
        Stage::Preprocess,
        Stage::Convert,
        Stage::Postprocess,
        Stage::Split,
        Stage::Cleanup,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Preprocess => "preprocess",
            Stage::Convert => "convert",
            Stage::Postprocess => "postprocess",
            Stage::Split => "split",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Called by the pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is single-threaded; `Send + Sync` is
/// required only so the callback can be stored in a cloneable config.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first stage.
    ///
    /// # Arguments
    /// * `total_stages` — number of stages that will run
    fn on_conversion_start(&self, total_stages: usize) {
        let _ = total_stages;
    }

    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`      — the finished stage
    /// * `elapsed_ms` — wall-clock time spent in the stage
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called after each chapter file is written.
    ///
    /// # Arguments
    /// * `index` — 0-based chapter index
    /// * `total` — number of chapters in the registry
    /// * `path`  — file that was written
    fn on_chapter_written(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once after the last stage.
    fn on_conversion_complete(&self, chapters_written: usize) {
        let _ = chapters_written;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        stages: Mutex<Vec<Stage>>,
        completed: AtomicUsize,
        chapters: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_stage_complete(&self, _stage: Stage, _elapsed_ms: u64) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chapter_written(&self, _index: usize, _total: usize, _path: &Path) {
            self.chapters.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(6);
        cb.on_stage_start(Stage::Fetch);
        cb.on_stage_complete(Stage::Fetch, 12);
        cb.on_chapter_written(0, 22, Path::new("lkmpg0.md"));
        cb.on_conversion_complete(22);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        for stage in Stage::ALL {
            tracker.on_stage_start(stage);
            tracker.on_stage_complete(stage, 0);
        }
        tracker.on_chapter_written(0, 2, Path::new("a.md"));
        tracker.on_chapter_written(1, 2, Path::new("b.md"));

        assert_eq!(*tracker.stages.lock().unwrap(), Stage::ALL.to_vec());
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 6);
        assert_eq!(tracker.chapters.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(Stage::Postprocess.to_string(), "postprocess");
        assert_eq!(Stage::Fetch.to_string(), "fetch");
    }
}
