//! Conversion entry points: run the whole pipeline for one book.
//!
//! [`convert`] is what the `tex2md` binary calls. [`convert_with`] takes the
//! converter as a parameter, so callers (and the integration tests) can
//! substitute anything implementing [`DocumentConverter`] for pandoc.

use crate::config::ConversionConfig;
use crate::error::Tex2MdError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::pandoc::{DocumentConverter, Pandoc};
use crate::pipeline::postprocess::{postprocess, PostprocessOptions};
use crate::pipeline::{fetch, preprocess, split};
use crate::progress::{ProgressCallback, Stage};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info};

/// Convert the book described by `config` using pandoc.
///
/// # Errors
/// Every failure is fatal; see [`Tex2MdError`]. Intermediate files are
/// removed on failure as well as on success (unless
/// `config.keep_intermediate` is set and the run succeeded).
pub fn convert(config: &ConversionConfig) -> Result<ConversionOutput, Tex2MdError> {
    let pandoc = Pandoc::new(&config.converter_program);
    convert_with(config, &pandoc)
}

/// Convert the book described by `config` using `converter`.
pub fn convert_with(
    config: &ConversionConfig,
    converter: &dyn DocumentConverter,
) -> Result<ConversionOutput, Tex2MdError> {
    let total_start = Instant::now();
    let cb = config.progress_callback.as_ref();
    info!("Starting conversion of {}", config.root_path().display());

    if let Some(cb) = cb {
        cb.on_conversion_start(Stage::ALL.len());
    }

    // ── Step 1: Fetch ────────────────────────────────────────────────────
    run_stage(cb, Stage::Fetch, || {
        if config.pull {
            fetch::pull(&config.source_dir, &config.remote)
        } else {
            info!("Skipping git pull");
            Ok(())
        }
    })?;

    let source_dir = canonical_source_dir(&config.source_dir)?;

    // ── Step 2: Pre-process ──────────────────────────────────────────────
    let tex_file = run_stage(cb, Stage::Preprocess, || {
        let root = source_dir.join(&config.root_document);
        let tex = read_source(&root)?;
        let tex = preprocess::preprocess(&tex, &source_dir)?;

        // Next to the root document so relative \input paths still resolve.
        let mut file = tempfile::Builder::new()
            .prefix(".tex2md-")
            .suffix(".tex")
            .tempfile_in(&source_dir)
            .map_err(|e| Tex2MdError::OutputWriteFailed {
                path: source_dir.clone(),
                source: e,
            })?;
        file.write_all(tex.as_bytes())
            .map_err(|e| Tex2MdError::OutputWriteFailed {
                path: file.path().to_path_buf(),
                source: e,
            })?;
        debug!("Wrote {} bytes to {}", tex.len(), file.path().display());
        Ok(file)
    })?;

    // ── Step 3: External conversion ──────────────────────────────────────
    let md_dir = tempfile::Builder::new()
        .prefix("tex2md-")
        .tempdir()
        .map_err(|e| Tex2MdError::Internal(format!("tempdir: {e}")))?;
    let md_path = md_dir.path().join("converted.md");

    let converter_start = Instant::now();
    let converted = run_stage(cb, Stage::Convert, || {
        converter.convert(tex_file.path(), &md_path, &source_dir)?;
        read_source(&md_path)
    })?;
    let converter_duration_ms = converter_start.elapsed().as_millis() as u64;
    info!(
        "{} produced {} bytes in {}ms",
        converter.name(),
        converted.len(),
        converter_duration_ms
    );

    // ── Step 4: Post-process ─────────────────────────────────────────────
    let post = run_stage(cb, Stage::Postprocess, || {
        postprocess(
            &converted,
            &PostprocessOptions {
                base_url: &config.base_url,
                source_browser_url: &config.source_browser_url,
                chapters: &config.chapters,
            },
        )
    })?;

    // ── Step 5: Split ────────────────────────────────────────────────────
    let chapters = run_stage(cb, Stage::Split, || {
        let slices = split::split_chapters(&post.markdown, &config.chapters, &config.base_url)?;
        split::write_chapters(&slices, config)
    })?;

    // ── Step 6: Cleanup ──────────────────────────────────────────────────
    let intermediate_files = run_stage(cb, Stage::Cleanup, || {
        cleanup(tex_file, md_dir, config.keep_intermediate)
    })?;

    let stats = ConversionStats {
        chapters_written: chapters.len(),
        images_resolved: chapters.iter().map(|c| c.images).sum(),
        labels_indexed: post.labels_indexed,
        references_resolved: post.references_resolved,
        converter_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} chapters, {} images, {} cross-references, {}ms total",
        stats.chapters_written,
        stats.images_resolved,
        stats.references_resolved,
        stats.total_duration_ms
    );

    if let Some(cb) = cb {
        cb.on_conversion_complete(stats.chapters_written);
    }

    Ok(ConversionOutput {
        chapters,
        stats,
        intermediate_files,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one stage, reporting start/completion to the progress callback.
fn run_stage<T>(
    cb: Option<&ProgressCallback>,
    stage: Stage,
    f: impl FnOnce() -> Result<T, Tex2MdError>,
) -> Result<T, Tex2MdError> {
    if let Some(cb) = cb {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let out = f()?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("Stage {} finished in {}ms", stage, elapsed_ms);
    if let Some(cb) = cb {
        cb.on_stage_complete(stage, elapsed_ms);
    }
    Ok(out)
}

/// Absolute source directory; the converter runs with a different cwd.
fn canonical_source_dir(dir: &Path) -> Result<PathBuf, Tex2MdError> {
    dir.canonicalize()
        .map_err(|_| Tex2MdError::SourceNotFound {
            path: dir.to_path_buf(),
        })
}

fn read_source(path: &Path) -> Result<String, Tex2MdError> {
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

/// Delete (or keep) the intermediate files. Returns the kept paths.
fn cleanup(
    tex_file: NamedTempFile,
    md_dir: TempDir,
    keep: bool,
) -> Result<Vec<PathBuf>, Tex2MdError> {
    if !keep {
        let tex_path = tex_file.path().to_path_buf();
        tex_file
            .close()
            .map_err(|e| Tex2MdError::OutputWriteFailed {
                path: tex_path,
                source: e,
            })?;
        let md_path = md_dir.path().to_path_buf();
        md_dir.close().map_err(|e| Tex2MdError::OutputWriteFailed {
            path: md_path,
            source: e,
        })?;
        return Ok(Vec::new());
    }

    let (_, tex_path) = tex_file
        .keep()
        .map_err(|e| Tex2MdError::Internal(format!("keeping intermediate .tex: {e}")))?;
    let md_path = md_dir.keep().join("converted.md");
    info!(
        "Kept intermediate files: {} and {}",
        tex_path.display(),
        md_path.display()
    );
    Ok(vec![tex_path, md_path])
}
