//! Configuration types for the LaTeX-to-wikidocs conversion.
//!
//! Every tunable of a run lives in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The defaults reproduce the published LKMPG
//! setup: a checkout in `./lkmpg`, chapters written to the working directory
//! as `lkmpg0.md` … `lkmpg21.md`, links pointing at `https://wikidocs.net/`.

use crate::chapters::ChapterRegistry;
use crate::error::Tex2MdError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default wikidocs site root. Always ends with `/`.
pub const DEFAULT_BASE_URL: &str = "https://wikidocs.net/";

/// Empty-text links under this prefix get their file path as link text.
pub const DEFAULT_SOURCE_BROWSER_URL: &str =
    "https://git.kernel.org/pub/scm/linux/kernel/git/stable/linux.git/tree/";

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use lkmpg_tex2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .source_dir("/src/lkmpg")
///     .output_dir("out")
///     .pull(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://wikidocs.net/");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Local checkout of the guide. Default: `lkmpg`.
    ///
    /// Sample paths in `\samplec{…}` are resolved relative to it and the
    /// converter runs with it as working directory.
    pub source_dir: PathBuf,

    /// Root LaTeX file inside `source_dir`. Default: `lkmpg.tex`.
    pub root_document: String,

    /// README inside `source_dir` published as chapter 0. Default: `README.md`.
    pub readme: String,

    /// Directory the chapter files are written to. Default: `.`.
    pub output_dir: PathBuf,

    /// Chapter file name prefix; file `k` is `<prefix><k>.md`. Default: `lkmpg`.
    pub output_prefix: String,

    /// Site root used for page and image links. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Source-browser prefix for link prettification.
    /// Default: [`DEFAULT_SOURCE_BROWSER_URL`].
    pub source_browser_url: String,

    /// Chapter number → page id mapping. Default: the 22 LKMPG chapters.
    pub chapters: ChapterRegistry,

    /// Run `git pull` before converting. Default: true.
    pub pull: bool,

    /// Remote to pull from. Default: `origin`.
    pub remote: String,

    /// Converter executable. Default: `pandoc`.
    pub converter_program: PathBuf,

    /// Keep the intermediate `.tex` and `.md` files. Default: false.
    pub keep_intermediate: bool,

    /// Stage and chapter events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("lkmpg"),
            root_document: "lkmpg.tex".to_string(),
            readme: "README.md".to_string(),
            output_dir: PathBuf::from("."),
            output_prefix: "lkmpg".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            source_browser_url: DEFAULT_SOURCE_BROWSER_URL.to_string(),
            chapters: ChapterRegistry::default(),
            pull: true,
            remote: "origin".to_string(),
            converter_program: PathBuf::from("pandoc"),
            keep_intermediate: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("source_dir", &self.source_dir)
            .field("root_document", &self.root_document)
            .field("readme", &self.readme)
            .field("output_dir", &self.output_dir)
            .field("output_prefix", &self.output_prefix)
            .field("base_url", &self.base_url)
            .field("source_browser_url", &self.source_browser_url)
            .field("chapters", &self.chapters.len())
            .field("pull", &self.pull)
            .field("remote", &self.remote)
            .field("converter_program", &self.converter_program)
            .field("keep_intermediate", &self.keep_intermediate)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Path of the root LaTeX file.
    pub fn root_path(&self) -> PathBuf {
        self.source_dir.join(&self.root_document)
    }

    /// Path of the README copied over chapter 0.
    pub fn readme_path(&self) -> PathBuf {
        self.source_dir.join(&self.readme)
    }

    /// Output path of chapter file `index`.
    pub fn chapter_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.md", self.output_prefix, index))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn root_document(mut self, name: impl Into<String>) -> Self {
        self.config.root_document = name.into();
        self
    }

    pub fn readme(mut self, name: impl Into<String>) -> Self {
        self.config.readme = name.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn source_browser_url(mut self, url: impl Into<String>) -> Self {
        self.config.source_browser_url = url.into();
        self
    }

    pub fn chapters(mut self, chapters: ChapterRegistry) -> Self {
        self.config.chapters = chapters;
        self
    }

    pub fn pull(mut self, v: bool) -> Self {
        self.config.pull = v;
        self
    }

    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.config.remote = remote.into();
        self
    }

    pub fn converter_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn keep_intermediate(mut self, v: bool) -> Self {
        self.config.keep_intermediate = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// The base URL is normalised to end with exactly one `/` so that page
    /// ids can be appended directly.
    pub fn build(mut self) -> Result<ConversionConfig, Tex2MdError> {
        let c = &mut self.config;
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(Tex2MdError::InvalidConfig(format!(
                "Base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        c.base_url = format!("{}/", c.base_url.trim_end_matches('/'));

        if c.output_prefix.trim().is_empty() {
            return Err(Tex2MdError::InvalidConfig(
                "Output prefix must not be empty".into(),
            ));
        }
        if c.root_document.trim().is_empty() {
            return Err(Tex2MdError::InvalidConfig(
                "Root document name must not be empty".into(),
            ));
        }
        if c.pull && c.remote.trim().is_empty() {
            return Err(Tex2MdError::InvalidConfig(
                "Remote must not be empty when pulling".into(),
            ));
        }
        c.chapters.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::Chapter;

    #[test]
    fn defaults_match_published_setup() {
        let c = ConversionConfig::builder().build().unwrap();
        assert_eq!(c.root_path(), PathBuf::from("lkmpg/lkmpg.tex"));
        assert_eq!(c.readme_path(), PathBuf::from("lkmpg/README.md"));
        assert_eq!(c.chapter_path(7), PathBuf::from("./lkmpg7.md"));
        assert!(c.pull);
        assert_eq!(c.chapters.len(), 22);
    }

    #[test]
    fn base_url_gets_single_trailing_slash() {
        let c = ConversionConfig::builder()
            .base_url("https://example.org/wiki//")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "https://example.org/wiki/");

        let c = ConversionConfig::builder()
            .base_url("https://example.org")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "https://example.org/");
    }

    #[test]
    fn non_http_base_url_rejected() {
        let err = ConversionConfig::builder()
            .base_url("wikidocs.net")
            .build()
            .unwrap_err();
        assert!(matches!(err, Tex2MdError::InvalidConfig(_)));
    }

    #[test]
    fn empty_prefix_rejected() {
        assert!(ConversionConfig::builder()
            .output_prefix(" ")
            .build()
            .is_err());
    }

    #[test]
    fn duplicate_registry_rejected() {
        let chapters = ChapterRegistry::new(vec![
            Chapter::new("1", "A", "1"),
            Chapter::new("1", "B", "2"),
        ]);
        assert!(ConversionConfig::builder().chapters(chapters).build().is_err());
    }

    #[test]
    fn debug_hides_callback() {
        let c = ConversionConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("source_dir"));
        assert!(s.contains("progress_callback: None"));
    }
}
