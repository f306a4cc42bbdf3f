//! Source fetching: bring the local checkout up to date with `git pull`.

use crate::error::Tex2MdError;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Pull `remote` into the checkout at `source_dir`.
///
/// Any failure (missing checkout, git not installed, network error, merge
/// conflict) aborts the run; there is no retry.
pub fn pull(source_dir: &Path, remote: &str) -> Result<(), Tex2MdError> {
    if !source_dir.is_dir() {
        return Err(Tex2MdError::SourceNotFound {
            path: source_dir.to_path_buf(),
        });
    }

    info!("Pulling {} into {}", remote, source_dir.display());
    let output = Command::new("git")
        .arg("-C")
        .arg(source_dir)
        .arg("pull")
        .arg(remote)
        .output()
        .map_err(|e| Tex2MdError::FetchFailed {
            path: source_dir.to_path_buf(),
            remote: remote.to_string(),
            detail: format!("could not run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Tex2MdError::FetchFailed {
            path: source_dir.to_path_buf(),
            remote: remote.to_string(),
            detail: format!("git exited with {}: {}", output.status, stderr.trim()),
        });
    }

    debug!("git: {}", String::from_utf8_lossy(&output.stdout).trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_checkout_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("lkmpg");
        match pull(&missing, "origin") {
            Err(Tex2MdError::SourceNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected SourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn non_repository_fails() {
        // A plain directory is not a git checkout; either git is missing or
        // it refuses to pull. Both are fatal.
        let dir = tempfile::tempdir().unwrap();
        let err = pull(dir.path(), "origin").unwrap_err();
        assert!(matches!(err, Tex2MdError::FetchFailed { .. }), "got: {err:?}");
    }
}
