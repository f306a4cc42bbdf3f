//! Pre-processing: LaTeX rewrites applied before handing the book to pandoc.
//!
//! LKMPG uses a handful of custom macros that pandoc does not know about.
//! Rather than teaching the converter, we rewrite them into constructs it
//! already handles well:
//!
//! | Source construct               | Rewritten to                               |
//! |--------------------------------|--------------------------------------------|
//! | `\samplec{examples/x.c}`       | `verbatim` block with the file's contents  |
//! | `code` / `codebash` blocks     | `verbatim` blocks                          |
//! | `\|text\|`, `\cpp\|text\|`     | `\texttt{text}`                            |
//! | `Figure~\ref{img:…}`           | `Figure N`                                 |
//! | `figure` environment           | `<!-- image N -->` + `Figure N: caption`   |
//!
//! The image placeholder survives conversion as text and is resolved to an
//! absolute wikidocs image URL by the splitter, once the chapter (and thus
//! the page id) is known.

use crate::error::Tex2MdError;
use crate::pipeline::rewrite::try_replace_all;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::debug;

/// Apply all pre-processing rules, in order.
///
/// `source_dir` is the directory `\samplec` paths are relative to.
pub fn preprocess(tex: &str, source_dir: &Path) -> Result<String, Tex2MdError> {
    let s = include_samples(tex, source_dir)?;
    let s = normalise_code_environments(&s);
    let s = normalise_inline_verbatim(&s);
    let s = number_figure_references(&s);
    Ok(replace_figures_with_captions(&s))
}

// ── Sample inclusion ─────────────────────────────────────────────────────────

static RE_SAMPLEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\samplec\{(.+?)\}").unwrap());

/// Replace each `\samplec{path}` with a verbatim block holding the file.
pub fn include_samples(tex: &str, source_dir: &Path) -> Result<String, Tex2MdError> {
    let mut included = 0usize;
    let out = try_replace_all(&RE_SAMPLEC, tex, |caps| {
        let path = source_dir.join(&caps[1]);
        let code = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Tex2MdError::SampleNotFound { path: path.clone() }
            } else {
                Tex2MdError::ReadFailed {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;
        included += 1;
        Ok(format!("\\begin{{verbatim}}\n{code}\n\\end{{verbatim}}"))
    })?;
    debug!("Included {} sample files", included);
    Ok(out)
}

// ── Block environments ───────────────────────────────────────────────────────

static RE_CODE_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(begin|end)\{(?:code|codebash|code-bash)\}").unwrap());

/// Rename `code` and `codebash` environments to `verbatim`.
pub fn normalise_code_environments(tex: &str) -> String {
    RE_CODE_ENV
        .replace_all(tex, |caps: &Captures<'_>| format!("\\{}{{verbatim}}", &caps[1]))
        .into_owned()
}

// ── Inline verbatim ──────────────────────────────────────────────────────────

static RE_INLINE_VERBATIM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:cpp)?\|(.+?)\|").unwrap());

/// Rewrite `\|text|` and `\cpp|text|` to `\texttt{text}`.
///
/// Backticks inside the text become `\textasciigrave{}`; pandoc would
/// otherwise read them as opening quotes and the shell command substitution
/// in snippets like ``linux-`uname -r` `` would be lost.
pub fn normalise_inline_verbatim(tex: &str) -> String {
    RE_INLINE_VERBATIM
        .replace_all(tex, |caps: &Captures<'_>| {
            let code = caps[1].replace('`', r"\textasciigrave{}");
            format!("\\texttt{{{code}}}")
        })
        .into_owned()
}

// ── Figures ──────────────────────────────────────────────────────────────────

static RE_FIGURE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Figure~\\ref\{img:(.+?)\}").unwrap());

static RE_FIGURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{figure\}(.*?)\\end\{figure\}").unwrap());

static RE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\caption\{").unwrap());

/// Replace `Figure~\ref{img:…}` with `Figure 1`, `Figure 2`, … in order.
pub fn number_figure_references(tex: &str) -> String {
    let mut counter = 0usize;
    RE_FIGURE_REF
        .replace_all(tex, |_: &Captures<'_>| {
            counter += 1;
            format!("Figure {counter}")
        })
        .into_owned()
}

/// Replace each figure environment with a numbered placeholder and its caption.
///
/// Figures without a caption are left alone and take no number.
pub fn replace_figures_with_captions(tex: &str) -> String {
    let mut counter = 0usize;
    let out = RE_FIGURE
        .replace_all(tex, |caps: &Captures<'_>| match caption(&caps[1]) {
            Some(text) => {
                counter += 1;
                format!("<!-- image {counter} -->\n\nFigure {counter}: {text}")
            }
            None => caps[0].to_string(),
        })
        .into_owned();
    debug!("Replaced {} figures with caption placeholders", counter);
    out
}

/// Argument of the first `\caption{…}` in `body`, braces balanced.
///
/// Escaped braces (`\{`, `\}`) do not count. `None` when there is no caption
/// or its argument is never closed.
fn caption(body: &str) -> Option<&str> {
    let start = RE_CAPTION.find(body)?.end();
    let mut depth = 1usize;
    let mut chars = body[start..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_samples_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello-1.c"), "int main(){}").unwrap();

        let out = include_samples(r"before \samplec{hello-1.c} after", dir.path()).unwrap();
        assert_eq!(
            out,
            "before \\begin{verbatim}\nint main(){}\n\\end{verbatim} after"
        );
    }

    #[test]
    fn test_include_samples_keeps_special_characters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("examples")).unwrap();
        let code = "pr_info(\"$1 \\n %s {x}\");\n";
        std::fs::write(dir.path().join("examples/a.c"), code).unwrap();

        let out = include_samples(r"\samplec{examples/a.c}", dir.path()).unwrap();
        assert!(out.contains(code), "got: {out}");
    }

    #[test]
    fn test_include_samples_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = include_samples(r"\samplec{nope.c}", dir.path()).unwrap_err();
        match err {
            Tex2MdError::SampleNotFound { path } => assert!(path.ends_with("nope.c")),
            other => panic!("expected SampleNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_code_environments() {
        let input = "\\begin{code}\nx\n\\end{code}\n\\begin{codebash}\nmake\n\\end{codebash}";
        assert_eq!(
            normalise_code_environments(input),
            "\\begin{verbatim}\nx\n\\end{verbatim}\n\\begin{verbatim}\nmake\n\\end{verbatim}"
        );
    }

    #[test]
    fn test_code_environment_leaves_other_envs() {
        let input = "\\begin{codeblock}\\begin{itemize}";
        assert_eq!(normalise_code_environments(input), input);
    }

    #[test]
    fn test_inline_verbatim() {
        assert_eq!(
            normalise_inline_verbatim(r"use \cpp|printk()| or \|insmod| now"),
            r"use \texttt{printk()} or \texttt{insmod} now"
        );
    }

    #[test]
    fn test_inline_verbatim_backticks() {
        assert_eq!(
            normalise_inline_verbatim(r"\|linux-`uname -r`|"),
            r"\texttt{linux-\textasciigrave{}uname -r\textasciigrave{}}"
        );
    }

    #[test]
    fn test_figure_references_numbered_in_order() {
        let input = r"see Figure~\ref{img:b} and Figure~\ref{img:a}, again Figure~\ref{img:b}";
        assert_eq!(
            number_figure_references(input),
            "see Figure 1 and Figure 2, again Figure 3"
        );
    }

    #[test]
    fn test_figures_replaced_with_captions() {
        let input = "A\n\\begin{figure}\n  \\center\n  \\includegraphics{a.png}\n  \\caption{First}\n  \\label{img:a}\n\\end{figure}\nB\n\\begin{figure}\\caption{Second}\\end{figure}";
        assert_eq!(
            replace_figures_with_captions(input),
            "A\n<!-- image 1 -->\n\nFigure 1: First\nB\n<!-- image 2 -->\n\nFigure 2: Second"
        );
    }

    #[test]
    fn test_figure_caption_with_nested_braces() {
        let input = "\\begin{figure}\\includegraphics{a.png}\\caption{Life of \\texttt{insmod} and \\{x\\}}\\label{img:a}\\end{figure}";
        assert_eq!(
            replace_figures_with_captions(input),
            "<!-- image 1 -->\n\nFigure 1: Life of \\texttt{insmod} and \\{x\\}"
        );
    }

    #[test]
    fn test_figure_without_caption_is_kept() {
        let input = "\\begin{figure}\\includegraphics{a.png}\\end{figure}\n\\begin{figure}\\caption{B}\\end{figure}";
        assert_eq!(
            replace_figures_with_captions(input),
            "\\begin{figure}\\includegraphics{a.png}\\end{figure}\n<!-- image 1 -->\n\nFigure 1: B"
        );
    }

    #[test]
    fn test_preprocess_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("s.sh"), "echo hi").unwrap();
        let input = "\\samplec{s.sh}\n\\begin{codebash}\nls\n\\end{codebash}\nrun \\|ls|";
        let out = preprocess(input, dir.path()).unwrap();
        assert_eq!(
            out,
            "\\begin{verbatim}\necho hi\n\\end{verbatim}\n\\begin{verbatim}\nls\n\\end{verbatim}\nrun \\texttt{ls}"
        );
    }
}
