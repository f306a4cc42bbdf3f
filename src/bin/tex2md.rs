//! CLI binary for lkmpg-tex2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lkmpg_tex2md::{
    convert, ChapterRegistry, ConversionConfig, ConversionOutput, ConversionProgressCallback,
    ProgressCallback, Stage,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: a spinner while the stages run, switching to
/// a bar once chapters are being written.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>2}/{len} chapters",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(style);
        self.bar.set_prefix("Writing");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(match stage {
            Stage::Fetch => "git pull…",
            Stage::Preprocess => "rewriting LaTeX…",
            Stage::Convert => "running pandoc…",
            Stage::Postprocess => "numbering and linking…",
            Stage::Split => "splitting chapters…",
            Stage::Cleanup => "removing intermediates…",
        });
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<12} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_chapter_written(&self, index: usize, total: usize, path: &Path) {
        if index == 0 {
            self.activate_bar(total);
        }
        self.bar.set_message(path.display().to_string());
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, chapters_written: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} chapters written",
            green("✔"),
            bold(&chapters_written.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pull ./lkmpg and write lkmpg0.md … lkmpg21.md into the current directory
  tex2md

  # Offline run into a separate directory
  tex2md --no-pull --output-dir wikidocs

  # Custom checkout and chapter registry
  tex2md --source-dir ~/src/lkmpg --chapters chapters.json

  # Keep the intermediate .tex/.md for debugging, JSON summary on stdout
  tex2md --keep-intermediate --json > run.json

CHAPTER REGISTRY FILE (--chapters):
  [
    { "number": "0", "title": "Title", "page_id": "196791" },
    { "number": "1", "title": "Introduction", "page_id": "196792" }
  ]

REQUIREMENTS:
  git and pandoc must be on PATH (or pass --pandoc <PATH>).
"#;

/// Convert the LKMPG LaTeX source into per-chapter wikidocs Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "tex2md",
    version,
    about = "Convert the LKMPG LaTeX source into per-chapter wikidocs Markdown",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local checkout of the guide.
    #[arg(long, env = "TEX2MD_SOURCE_DIR", default_value = "lkmpg")]
    source_dir: PathBuf,

    /// Root LaTeX file inside the checkout.
    #[arg(long, env = "TEX2MD_ROOT", default_value = "lkmpg.tex")]
    root: String,

    /// README inside the checkout, published as chapter 0.
    #[arg(long, env = "TEX2MD_README", default_value = "README.md")]
    readme: String,

    /// Directory to write the chapter files to.
    #[arg(short, long, env = "TEX2MD_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Chapter file prefix: <prefix><n>.md.
    #[arg(long, env = "TEX2MD_PREFIX", default_value = "lkmpg")]
    prefix: String,

    /// Site root for page and image links.
    #[arg(long, env = "TEX2MD_BASE_URL", default_value = lkmpg_tex2md::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Source-browser URL prefix whose empty links get their path as text.
    #[arg(
        long,
        env = "TEX2MD_SOURCE_BROWSER_URL",
        default_value = lkmpg_tex2md::config::DEFAULT_SOURCE_BROWSER_URL
    )]
    source_browser_url: String,

    /// JSON file with the chapter registry (default: built-in LKMPG chapters).
    #[arg(long, env = "TEX2MD_CHAPTERS")]
    chapters: Option<PathBuf>,

    /// Git remote to pull from.
    #[arg(long, env = "TEX2MD_REMOTE", default_value = "origin")]
    remote: String,

    /// Skip `git pull`.
    #[arg(long, env = "TEX2MD_NO_PULL")]
    no_pull: bool,

    /// pandoc executable.
    #[arg(long, env = "TEX2MD_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Keep the intermediate .tex and .md files.
    #[arg(long, env = "TEX2MD_KEEP_INTERMEDIATE")]
    keep_intermediate: bool,

    /// Print a JSON run summary (ConversionOutput) on stdout.
    #[arg(long, env = "TEX2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TEX2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEX2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEX2MD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&config).context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output, &config);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let chapters = match cli.chapters {
        Some(ref path) => ChapterRegistry::from_json_file(path)
            .with_context(|| format!("Failed to load chapter registry from {:?}", path))?,
        None => ChapterRegistry::default(),
    };

    let mut builder = ConversionConfig::builder()
        .source_dir(&cli.source_dir)
        .root_document(&cli.root)
        .readme(&cli.readme)
        .output_dir(&cli.output_dir)
        .output_prefix(&cli.prefix)
        .base_url(&cli.base_url)
        .source_browser_url(&cli.source_browser_url)
        .chapters(chapters)
        .pull(!cli.no_pull)
        .remote(&cli.remote)
        .converter_program(&cli.pandoc)
        .keep_intermediate(cli.keep_intermediate);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &ConversionOutput, config: &ConversionConfig) {
    let stats = &output.stats;
    eprintln!(
        "{}  {} chapters  {} images  {} cross-references  {}ms  →  {}",
        green("✔"),
        stats.chapters_written,
        stats.images_resolved,
        stats.references_resolved,
        stats.total_duration_ms,
        bold(&config.output_dir.display().to_string()),
    );
    eprintln!(
        "   {} labels indexed  /  pandoc {}ms",
        dim(&stats.labels_indexed.to_string()),
        dim(&stats.converter_duration_ms.to_string()),
    );
    for path in &output.intermediate_files {
        eprintln!("   {} kept {}", cyan("•"), path.display());
    }
}
