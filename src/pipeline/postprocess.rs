//! Post-processing: turn pandoc's Markdown into wikidocs-ready Markdown.
//!
//! pandoc gets the structure right but leaves LaTeX-isms behind: unnumbered
//! headings, `{#label}` attributes, `{reference-type="ref"}` spans, empty link
//! texts, `::: flushleft` fenced divs and backslash-escaped punctuation.
//! This module fixes them with a fixed sequence of passes.
//!
//! ## Pass Order
//!
//! Numbering runs first because the reference index reads the numbers back.
//! The index is built before any label is stripped. Escape stripping runs
//! last: every earlier pattern matches pandoc's escaped delimiters
//! (`\[`, `\|`, `\<`), which would be gone otherwise.

use crate::chapters::ChapterRegistry;
use crate::error::Tex2MdError;
use crate::pipeline::numbering::number_headings;
use crate::pipeline::references::{
    convert_reference_labels, convert_section_references, count_cross_references,
    resolve_cross_references, ReferenceIndex,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Inputs the post-processor needs besides the document.
#[derive(Debug, Clone, Copy)]
pub struct PostprocessOptions<'a> {
    /// Site root, ending with `/`.
    pub base_url: &'a str,
    /// Prefix of source-browser links that get a visible file path.
    pub source_browser_url: &'a str,
    pub chapters: &'a ChapterRegistry,
}

/// Result of [`postprocess`].
#[derive(Debug, Clone)]
pub struct PostprocessOutput {
    pub markdown: String,
    /// Labels recorded in the reference index.
    pub labels_indexed: usize,
    /// Cross-reference spans rewritten into links.
    pub references_resolved: usize,
}

/// Apply all post-processing passes to pandoc's output.
///
/// Passes (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Number chapter and section headings
/// 3. Build the label → section index
/// 4. Drop chapter labels, anchor section labels
/// 5. Turn standalone labels into anchors
/// 6. Resolve cross-references into absolute links
/// 7. Give empty source-browser links their file path as text
/// 8. Turn `\|code\|` into inline code with a safe backtick fence
/// 9. Remove `::: flushleft` markers
/// 10. Strip backslash escapes from punctuation
pub fn postprocess(
    md: &str,
    opts: &PostprocessOptions<'_>,
) -> Result<PostprocessOutput, Tex2MdError> {
    let s = normalise_line_endings(md);
    let s = number_headings(&s);

    let index = ReferenceIndex::build(&s);
    debug!("Indexed {} labels", index.len());

    let s = convert_section_references(&s);
    let s = convert_reference_labels(&s);

    let references_resolved = count_cross_references(&s);
    let s = resolve_cross_references(&s, &index, opts.chapters, opts.base_url)?;
    debug!("Resolved {} cross-references", references_resolved);

    let s = convert_source_links(&s, opts.source_browser_url)?;
    let s = convert_inline_code(&s);
    let s = remove_flushleft(&s);
    let markdown = unescape_punctuation(&s);

    Ok(PostprocessOutput {
        markdown,
        labels_indexed: index.len(),
        references_resolved,
    })
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 7: Source-browser links ─────────────────────────────────────────────

/// `[](<prefix>fs/proc/base.c)` → `[fs/proc/base.c](<prefix>fs/proc/base.c)`.
pub fn convert_source_links(md: &str, prefix: &str) -> Result<String, Tex2MdError> {
    let re = Regex::new(&format!(r"\[\]\(({}(.+?))\)", regex::escape(prefix)))
        .map_err(|e| Tex2MdError::Internal(format!("source link pattern: {e}")))?;
    Ok(re
        .replace_all(md, |caps: &Captures<'_>| {
            format!("[{}]({})", &caps[2], &caps[1])
        })
        .into_owned())
}

// ── Rule 8: Inline code ──────────────────────────────────────────────────────

static RE_PIPE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\|(.+?)\\\|").unwrap());

/// Turn leftover `\|code\|` spans into Markdown inline code.
pub fn convert_inline_code(md: &str) -> String {
    RE_PIPE_CODE
        .replace_all(md, |caps: &Captures<'_>| fence_inline_code(&caps[1]))
        .into_owned()
}

/// Wrap `code` in a backtick fence it cannot close early.
///
/// The fence is one backtick longer than the longest run inside the code.
/// When the code contains backticks it is padded with a space on each side,
/// which CommonMark strips again; this keeps a leading or trailing backtick
/// from merging into the fence.
pub fn fence_inline_code(code: &str) -> String {
    let longest = code.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if longest == 0 {
        format!("{fence}{code}{fence}")
    } else {
        format!("{fence} {code} {fence}")
    }
}

// ── Rule 9: Flush-left markers ───────────────────────────────────────────────

fn remove_flushleft(md: &str) -> String {
    md.replace("\n::: flushleft", "").replace("\n:::", "")
}

// ── Rule 10: Escaped punctuation ─────────────────────────────────────────────

/// Remove every backslash that directly precedes ASCII punctuation.
///
/// The result never contains a backslash followed by punctuation, so a
/// second application changes nothing. The price is that an escaped
/// backslash in front of punctuation loses both backslashes: pandoc's
/// `\\"` (a literal `\"`) comes out as a bare `"`.
pub fn unescape_punctuation(md: &str) -> String {
    let mut out = String::with_capacity(md.len());
    let mut chars = md.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(char::is_ascii_punctuation) {
            continue;
        }
        out.push(c);
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
