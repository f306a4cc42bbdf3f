//! Heading numbering: prefix chapter and section titles with `3.` / `3.2.`.
//!
//! pandoc emits LaTeX `\section`s as `# Title {#label}` and `\subsection`s as
//! `## Title {#label}`, without numbers. The published book refers to
//! sections by number ("see 5.2"), so numbers are computed here from document
//! order and written into the titles. Later passes (the reference index,
//! the splitter) read them back.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Running chapter/section counter for one numbering pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionCounter {
    pub chapter: u32,
    pub section: u32,
}

impl SectionCounter {
    /// Enter the next chapter and return its number, e.g. `"4"`.
    pub fn enter_chapter(&mut self) -> String {
        self.chapter += 1;
        self.section = 0;
        self.chapter.to_string()
    }

    /// Enter the next section of the current chapter, e.g. `"4.2"`.
    pub fn enter_section(&mut self) -> String {
        self.section += 1;
        format!("{}.{}", self.chapter, self.section)
    }
}

// Chapter titles run to the end of the line (the optional `{#label}` is kept
// as part of the title). Sections must carry a label.
static RE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n# (?P<chapter>.+)|\s## (?P<section>.+?)\s*\{#(?P<label>.+?)\}").unwrap()
});

/// Number every chapter and section heading in document order.
///
/// A fresh [`SectionCounter`] is used for each call.
pub fn number_headings(md: &str) -> String {
    let mut counter = SectionCounter::default();
    RE_HEADING
        .replace_all(md, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let (title, number) = match (caps.name("chapter"), caps.name("section")) {
                (Some(title), _) => (title, counter.enter_chapter()),
                (None, Some(title)) => (title, counter.enter_section()),
                (None, None) => return whole.to_string(),
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            let split = title.start() - start;
            format!("{}{}. {}", &whole[..split], number, &whole[split..])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let mut c = SectionCounter::default();
        assert_eq!(c.enter_chapter(), "1");
        assert_eq!(c.enter_section(), "1.1");
        assert_eq!(c.enter_section(), "1.2");
        assert_eq!(c.enter_chapter(), "2");
        assert_eq!(c.enter_section(), "2.1");
    }

    #[test]
    fn test_numbers_chapters_and_sections() {
        let input = "---\ntitle: x\n---\n\n# Introduction {#sec:introduction}\n\ntext\n\n## Authorship {#sec:authorship}\n\n## Acknowledgements {#sec:acknowledgements}\n\n# Headers {#sec:headers}\n\n## Installing {#sec:install}\n";
        let out = number_headings(input);
        assert!(out.contains("\n# 1. Introduction {#sec:introduction}\n"), "got: {out}");
        assert!(out.contains("\n## 1.1. Authorship {#sec:authorship}\n"));
        assert!(out.contains("\n## 1.2. Acknowledgements {#sec:acknowledgements}\n"));
        assert!(out.contains("\n# 2. Headers {#sec:headers}\n"));
        assert!(out.contains("\n## 2.1. Installing {#sec:install}\n"));
    }

    #[test]
    fn test_chapter_without_label() {
        let out = number_headings("x\n# Where To Go From Here?\n\ntext");
        assert_eq!(out, "x\n# 1. Where To Go From Here?\n\ntext");
    }

    #[test]
    fn test_unlabelled_section_is_ignored() {
        let input = "x\n# A {#a}\n\n## Unlabelled\n\n## Labelled {#l}\n";
        let out = number_headings(input);
        assert!(out.contains("\n## Unlabelled\n"));
        assert!(out.contains("\n## 1.1. Labelled {#l}"));
    }

    #[test]
    fn test_repeated_titles_numbered_independently() {
        // Two sections with the same title must get different numbers.
        let input = "x\n# A {#a}\n\n## Example {#a1}\n\n# B {#b}\n\n## Example {#b1}\n";
        let out = number_headings(input);
        assert!(out.contains("## 1.1. Example {#a1}"));
        assert!(out.contains("## 2.1. Example {#b1}"));
    }

    #[test]
    fn test_numbering_is_monotonic() {
        let mut doc = String::from("preamble");
        for c in 0..6 {
            doc.push_str(&format!("\n# Chapter {c} {{#ch{c}}}\n\nbody\n"));
            for s in 0..(c % 4) {
                doc.push_str(&format!("\n## Section {s} {{#ch{c}s{s}}}\n\nbody\n"));
            }
        }
        let out = number_headings(&doc);

        let mut last_chapter = 0u32;
        let mut last_section = 0u32;
        for line in out.lines() {
            if let Some(rest) = line.strip_prefix("# ") {
                let n: u32 = rest.split('.').next().unwrap().parse().unwrap();
                assert_eq!(n, last_chapter + 1, "line: {line}");
                last_chapter = n;
                last_section = 0;
            } else if let Some(rest) = line.strip_prefix("## ") {
                let number = rest.split(". ").next().unwrap();
                let (c, s) = number.split_once('.').unwrap();
                assert_eq!(c.parse::<u32>().unwrap(), last_chapter, "line: {line}");
                assert_eq!(s.parse::<u32>().unwrap(), last_section + 1, "line: {line}");
                last_section += 1;
            }
        }
        assert_eq!(last_chapter, 6);
    }

    #[test]
    fn test_fresh_counter_per_call() {
        let input = "x\n# A {#a}\n";
        assert_eq!(number_headings(input), number_headings(input));
    }
}
