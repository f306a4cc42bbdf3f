//! External conversion: LaTeX → Markdown via pandoc.
//!
//! The bulk structural conversion (headings, lists, tables, verbatim blocks)
//! is delegated to an external converter. The [`DocumentConverter`] trait is
//! the seam: [`Pandoc`] is the production implementation, and tests plug in a
//! converter that writes canned Markdown so the rest of the pipeline can be
//! exercised without pandoc installed.

use crate::error::Tex2MdError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Converts a pre-processed LaTeX file into Markdown.
pub trait DocumentConverter {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Convert `input` into `output`.
    ///
    /// `working_dir` is the source checkout, so relative `\input{…}` and
    /// `\includegraphics{…}` paths resolve the way they do for `pdflatex`.
    fn convert(&self, input: &Path, output: &Path, working_dir: &Path)
        -> Result<(), Tex2MdError>;
}

/// Runs `pandoc --wrap=none -s <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct Pandoc {
    program: PathBuf,
}

impl Default for Pandoc {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Pandoc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, input: &Path, output: &Path, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--wrap=none")
            .arg("-s")
            .arg(input)
            .arg("-o")
            .arg(output)
            .current_dir(working_dir);
        cmd
    }
}

impl DocumentConverter for Pandoc {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        working_dir: &Path,
    ) -> Result<(), Tex2MdError> {
        info!(
            "Running {} on {} → {}",
            self.program.display(),
            input.display(),
            output.display()
        );

        let result = self
            .command(input, output, working_dir)
            .output()
            .map_err(|e| Tex2MdError::ConverterLaunchFailed {
                program: self.program.clone(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        if !result.status.success() {
            return Err(Tex2MdError::ConverterFailed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!("pandoc stderr:\n{}", stderr);
        }
        Ok(())
    }
}
