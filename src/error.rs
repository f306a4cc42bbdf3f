//! Error types for the lkmpg-tex2md library.
//!
//! Every failure in the pipeline is fatal: a half-converted book is worse
//! than no output, because the published chapters link into each other and a
//! missing label silently breaks every page that references it. All library
//! entry points therefore return `Err(Tex2MdError)` and stop at the first
//! problem. Intermediate files are owned by [`tempfile`] handles, so they are
//! removed even when a stage fails.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the lkmpg-tex2md library.
#[derive(Debug, Error)]
pub enum Tex2MdError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// The source checkout (or a file expected inside it) does not exist.
    #[error("Source not found: '{path}'\nClone the guide first: git clone https://github.com/sysprog21/lkmpg {path:?}")]
    SourceNotFound { path: PathBuf },

    /// `git pull` could not be launched or exited with an error.
    #[error("Failed to pull '{remote}' into '{path}': {detail}")]
    FetchFailed {
        path: PathBuf,
        remote: String,
        detail: String,
    },

    /// A file could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `\samplec{…}` directive names a file that does not exist.
    #[error("Sample file not found: '{path}'\nReferenced by a \\samplec directive.")]
    SampleNotFound { path: PathBuf },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The external converter program could not be started.
    #[error("Failed to launch converter '{program}': {source}\nIs pandoc installed? Override with --pandoc <PATH>.")]
    ConverterLaunchFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external converter ran but reported failure.
    #[error("Converter '{program}' exited with {status}\n{stderr}")]
    ConverterFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    // ── Cross-reference errors ────────────────────────────────────────────
    /// A cross-reference points at a label no heading or anchor defines.
    #[error("Unresolved cross-reference to label '{label}'")]
    UnresolvedReference { label: String },

    /// A chapter number has no entry in the chapter registry.
    #[error("Chapter '{chapter}' is not in the chapter registry")]
    UnknownChapter { chapter: String },

    /// The converted document has fewer chapters than the registry lists.
    #[error("Chapter registry lists {expected} chapters but the document only has {found}\nUpdate the registry or pass --chapters <FILE>.")]
    ChapterCountMismatch { expected: usize, found: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output or intermediate file.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A chapter registry file could not be read or parsed.
    #[error("Failed to load chapter registry '{path}': {detail}")]
    RegistryLoadFailed { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
