//! Result types returned by [`crate::convert`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One chapter file written by the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutput {
    /// 0-based position in the chapter registry.
    pub index: usize,
    pub number: String,
    pub title: String,
    pub page_id: String,
    pub path: PathBuf,
    /// Image placeholders resolved to URLs in this chapter.
    pub images: usize,
    /// Size of the written file in bytes.
    pub bytes: usize,
    /// True when the file is a copy of the README rather than a split slice.
    pub from_readme: bool,
}

/// Counters and timings for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub chapters_written: usize,
    pub images_resolved: usize,
    pub labels_indexed: usize,
    pub references_resolved: usize,
    pub converter_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub chapters: Vec<ChapterOutput>,
    pub stats: ConversionStats,
    /// Intermediate files left on disk (only with `keep_intermediate`).
    pub intermediate_files: Vec<PathBuf>,
}
