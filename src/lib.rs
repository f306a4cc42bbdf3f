//! # lkmpg-tex2md
//!
//! Convert the LaTeX source of *The Linux Kernel Module Programming Guide*
//! into one Markdown file per chapter, ready to paste into wikidocs.net.
//!
//! ## Pipeline Overview
//!
//! ```text
//! lkmpg/ checkout
//!  │
//!  ├─ 1. Fetch        git pull the upstream repository
//!  ├─ 2. Preprocess   inline \samplec files, normalise code/figure macros
//!  ├─ 3. Convert      pandoc --wrap=none -s (external process)
//!  ├─ 4. Postprocess  number headings, resolve cross-references, fix links
//!  ├─ 5. Split        lkmpg0.md … lkmpg21.md, images linked per page
//!  └─ 6. Cleanup      remove intermediate files
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lkmpg_tex2md::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .source_dir("lkmpg")
//!         .output_dir("wikidocs")
//!         .build()?;
//!     let output = convert(&config)?;
//!     eprintln!(
//!         "{} chapters, {} cross-references",
//!         output.stats.chapters_written, output.stats.references_resolved
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tex2md` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chapters;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chapters::{Chapter, ChapterRegistry};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_with};
pub use error::Tex2MdError;
pub use output::{ChapterOutput, ConversionOutput, ConversionStats};
pub use pipeline::pandoc::{DocumentConverter, Pandoc};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
