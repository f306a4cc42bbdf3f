//! Cross-references: index labels, turn them into anchors, resolve links.
//!
//! Resolution is two-phase. [`ReferenceIndex::build`] scans the *numbered*
//! document and records which section every label belongs to; the result is
//! passed explicitly to [`resolve_cross_references`], which rewrites pandoc's
//! `[text](#anchor){reference-type="ref" reference="label"}` spans into
//! absolute wikidocs links.
//!
//! Chapters live on separate pages, so a link needs the target chapter's page
//! id (from the [`ChapterRegistry`]) and, for anything below chapter level,
//! an `#anchor` on that page. Section anchors are emitted as
//! `<a name="label"></a>` right before the section heading.

use crate::chapters::ChapterRegistry;
use crate::error::Tex2MdError;
use crate::pipeline::rewrite::try_replace_all;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

// ── Phase 1: index ───────────────────────────────────────────────────────────

static RE_INDEX_CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^# (\d+)\. ").unwrap());

static RE_INDEX_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^# (\d+?)\. (.+?)\s*\{#(.+?)\}").unwrap());

static RE_INDEX_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^## (\d+?\.\d+?)\. (.+?)\s*\{#(.+?)\}").unwrap());

// pandoc's rendering of a `\label` outside a heading.
static RE_STANDALONE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[\\\[([^\]]+?)\\\]\]\{#([^\s}]+) label="([^"]+)"\}"#).unwrap()
});

/// Label → section number (`"3"` or `"3.2"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    sections: HashMap<String, String>,
}

impl ReferenceIndex {
    /// Scan a numbered document line by line.
    ///
    /// Heading labels map to the heading's number. Standalone labels map to
    /// the most recent heading number seen above them (`"0"` before the
    /// first heading).
    pub fn build(md: &str) -> Self {
        let mut sections = HashMap::new();
        let mut current = String::from("0");

        for line in md.lines() {
            if let Some(caps) = RE_INDEX_CHAPTER_NUMBER.captures(line) {
                current = caps[1].to_string();
            }
            if let Some(caps) = RE_INDEX_CHAPTER.captures(line) {
                current = caps[1].to_string();
                sections.insert(caps[3].to_string(), current.clone());
            }
            if let Some(caps) = RE_INDEX_SECTION.captures(line) {
                current = caps[1].to_string();
                sections.insert(caps[3].to_string(), current.clone());
            }
            for caps in RE_STANDALONE_LABEL.captures_iter(line) {
                sections.insert(caps[3].to_string(), current.clone());
            }
        }

        Self { sections }
    }

    /// Section number recorded for `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.sections.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, section: impl Into<String>) {
        self.sections.insert(label.into(), section.into());
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// ── Anchors ──────────────────────────────────────────────────────────────────

static RE_LABELLED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\s# (?P<ctitle>.+?)\s*\{#(?P<clabel>.+?)\}|\s## (?P<stitle>.+?)\s*\{#(?P<slabel>.+?)\}",
    )
    .unwrap()
});

/// Drop chapter labels and put an anchor before every labelled section.
///
/// Chapters are linked by page, so their labels are not needed.
pub fn convert_section_references(md: &str) -> String {
    RE_LABELLED_HEADING
        .replace_all(md, |caps: &Captures<'_>| {
            if let Some(title) = caps.name("ctitle") {
                format!("\n# {}", title.as_str())
            } else if let (Some(title), Some(label)) = (caps.name("stitle"), caps.name("slabel")) {
                format!(
                    "\n<a name=\"{}\"></a>\n\n## {}",
                    label.as_str(),
                    title.as_str()
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Replace standalone label spans with bare anchors.
pub fn convert_reference_labels(md: &str) -> String {
    RE_STANDALONE_LABEL
        .replace_all(md, |caps: &Captures<'_>| {
            format!("<a name=\"{}\"></a>", &caps[3])
        })
        .into_owned()
}

// ── Phase 2: resolve ─────────────────────────────────────────────────────────

// Link text may hold escaped brackets (`\[sec:x\]`) but no bare ones, so a
// match never starts inside an earlier link on the same line.
static RE_XREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\[((?:\\.|[^\[\]\\])+)\]\(#([^)]+)\)\{reference-type="ref" reference="([^"]+)"\}"#,
    )
    .unwrap()
});

static RE_BARE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Number of cross-reference spans in `md`.
pub fn count_cross_references(md: &str) -> usize {
    RE_XREF.find_iter(md).count()
}

/// Rewrite every cross-reference into an absolute link.
///
/// The visible text decides the target:
/// * `5.2` (contains a dot) → `[5.2](<base><page of 5>#anchor)`
/// * `5` (bare integer)     → `[5](<base><page of 5>)`
/// * anything else          → the label's section number from `index`,
///   linked with its anchor.
///
/// `base_url` must end with `/`.
pub fn resolve_cross_references(
    md: &str,
    index: &ReferenceIndex,
    chapters: &ChapterRegistry,
    base_url: &str,
) -> Result<String, Tex2MdError> {
    let page = |chapter: &str| {
        chapters
            .page_id(chapter)
            .ok_or_else(|| Tex2MdError::UnknownChapter {
                chapter: chapter.to_string(),
            })
    };

    try_replace_all(&RE_XREF, md, |caps| {
        let text = &caps[1];
        let anchor = &caps[2];
        let label = &caps[3];

        if text.contains('.') {
            let page_id = page(chapter_of(text))?;
            Ok(format!("[{text}]({base_url}{page_id}#{anchor})"))
        } else if RE_BARE_INTEGER.is_match(text) {
            let page_id = page(text)?;
            Ok(format!("[{text}]({base_url}{page_id})"))
        } else {
            let section = index
                .get(label)
                .ok_or_else(|| Tex2MdError::UnresolvedReference {
                    label: label.to_string(),
                })?;
            let page_id = page(chapter_of(section))?;
            Ok(format!("[{section}]({base_url}{page_id}#{anchor})"))
        }
    })
}

/// `"5.2"` → `"5"`.
fn chapter_of(number: &str) -> &str {
    number.split_once('.').map_or(number, |(chapter, _)| chapter)
}

// ── Tests ────────────────────────────────────────────────────────────────────
