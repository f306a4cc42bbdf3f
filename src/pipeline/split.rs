//! Splitting: one Markdown file per chapter.
//!
//! The post-processed book is cut at every top-level heading marker
//! (`\n# `). Slice `k` belongs to registry entry `k`; slice 0 is whatever
//! precedes the first chapter (pandoc's title block) and is replaced by the
//! repository README when written.
//!
//! Image placeholders are resolved per slice because the image URL contains
//! the page id of the chapter the image is published on.

use crate::chapters::ChapterRegistry;
use crate::config::ConversionConfig;
use crate::error::Tex2MdError;
use crate::output::ChapterOutput;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::{debug, info, warn};

const CHAPTER_MARKER: &str = "\n# ";

/// A chapter's Markdown before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSlice {
    pub index: usize,
    pub number: String,
    pub title: String,
    pub page_id: String,
    pub markdown: String,
    /// Image placeholders resolved in `markdown`.
    pub images: usize,
}

/// Cut `md` into one slice per registry entry.
///
/// Fails with [`Tex2MdError::ChapterCountMismatch`] when the document runs
/// out of chapters before the registry does. Surplus chapters are appended
/// to the last slice with a warning.
pub fn split_chapters(
    md: &str,
    chapters: &ChapterRegistry,
    base_url: &str,
) -> Result<Vec<ChapterSlice>, Tex2MdError> {
    let total = chapters.len();
    let mut slices = Vec::with_capacity(total);
    let mut rest = Some(md);

    for (index, chapter) in chapters.iter().enumerate() {
        let Some(remaining) = rest else {
            return Err(Tex2MdError::ChapterCountMismatch {
                expected: total,
                found: index,
            });
        };

        let (head, tail) = match remaining.split_once(CHAPTER_MARKER) {
            Some((head, tail)) => (head, Some(tail)),
            None => (remaining, None),
        };
        rest = tail;

        let mut text = head.to_string();
        if index + 1 == total {
            if let Some(surplus) = tail {
                warn!(
                    "Document has {} more chapter(s) than the registry; appending them to chapter {}",
                    surplus.matches(CHAPTER_MARKER).count() + 1,
                    chapter.number
                );
                text.push_str(CHAPTER_MARKER);
                text.push_str(surplus);
            }
        }

        let (markdown, images) = insert_images(&text, base_url, &chapter.page_id);
        debug!(
            "Chapter {} ({}): {} bytes, {} images",
            chapter.number,
            chapter.title,
            markdown.len(),
            images
        );
        slices.push(ChapterSlice {
            index,
            number: chapter.number.clone(),
            title: chapter.title.clone(),
            page_id: chapter.page_id.clone(),
            markdown,
            images,
        });
    }

    Ok(slices)
}

// ── Images ───────────────────────────────────────────────────────────────────

static RE_IMAGE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- image (\d+) -->").unwrap());

/// Replace `<!-- image N -->` with the wikidocs URL of figure N on `page_id`.
///
/// Returns the rewritten text and the number of placeholders replaced.
pub fn insert_images(md: &str, base_url: &str, page_id: &str) -> (String, usize) {
    let mut count = 0usize;
    let out = RE_IMAGE_PLACEHOLDER
        .replace_all(md, |caps: &Captures<'_>| {
            count += 1;
            format!("![]({base_url}images/page/{page_id}/Figure{}.png)", &caps[1])
        })
        .into_owned();
    (out, count)
}

// ── Writing ──────────────────────────────────────────────────────────────────

/// Write every slice to `config.chapter_path(index)`.
///
/// Chapter 0 is written from the README instead of its slice. The README is
/// read before anything is written, so a missing README leaves the output
/// directory untouched.
pub fn write_chapters(
    slices: &[ChapterSlice],
    config: &ConversionConfig,
) -> Result<Vec<ChapterOutput>, Tex2MdError> {
    let readme_path = config.readme_path();
    let readme = read_readme(&readme_path)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|e| Tex2MdError::OutputWriteFailed {
        path: config.output_dir.clone(),
        source: e,
    })?;

    let total = slices.len();
    let mut written = Vec::with_capacity(total);
    for slice in slices {
        let path = config.chapter_path(slice.index);
        let from_readme = slice.index == 0;
        let (content, images) = if from_readme {
            (readme.as_str(), 0)
        } else {
            (slice.markdown.as_str(), slice.images)
        };

        std::fs::write(&path, content).map_err(|e| Tex2MdError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!("Wrote {}", path.display());

        if let Some(ref cb) = config.progress_callback {
            cb.on_chapter_written(slice.index, total, &path);
        }

        written.push(ChapterOutput {
            index: slice.index,
            number: slice.number.clone(),
            title: slice.title.clone(),
            page_id: slice.page_id.clone(),
            path,
            images,
            bytes: content.len(),
            from_readme,
        });
    }

    info!(
        "Wrote {} chapters to {}",
        written.len(),
        config.output_dir.display()
    );
    Ok(written)
}

fn read_readme(path: &Path) -> Result<String, Tex2MdError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Tex2MdError::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Tex2MdError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
