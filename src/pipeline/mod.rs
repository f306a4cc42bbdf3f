//! Pipeline stages for LaTeX-to-wikidocs conversion.
//!
//! Each submodule implements one step; text stages are pure `&str → String`
//! functions (or `Result<String>` when they can fail) so they can be tested
//! without touching the file system.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ preprocess ──▶ pandoc ──▶ postprocess ──▶ split
//! (git)     (LaTeX)        (extern)   (Markdown)      (files)
//! ```
//!
//! 1. [`fetch`]       — `git pull` the source checkout
//! 2. [`preprocess`]  — inline samples, normalise code/figure macros
//! 3. [`pandoc`]      — external LaTeX → Markdown conversion
//! 4. [`postprocess`] — numbering, cross-references, links, escapes
//!    (with [`numbering`] and [`references`] doing the bookkeeping)
//! 5. [`split`]       — one file per chapter, README as chapter 0

pub mod fetch;
pub mod numbering;
pub mod pandoc;
pub mod postprocess;
pub mod preprocess;
pub mod references;
pub mod rewrite;
pub mod split;
