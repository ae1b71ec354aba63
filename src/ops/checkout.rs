//! Resolve which checkout an operation works on.
//!
//! Explicit values win; anything missing is detected from the VCS.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::repository::repo_uri;
use crate::vcs::detect;

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub root: Option<PathBuf>,
    pub clone_url: Option<String>,
    pub commit_id: Option<String>,
    pub vcs: Option<String>,
}

/// The checkout an operation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSpec {
    pub root: PathBuf,
    pub clone_url: String,
    pub commit_id: String,
    pub vcs: String,
}

impl CheckoutSpec {
    /// Repository URI derived from the clone URL.
    pub fn uri(&self) -> String {
        repo_uri(&self.clone_url)
    }
}

/// Fill in whatever `opts` leaves unset by detecting the VCS at the root
/// (or `cwd` when no root is given).
pub fn resolve_checkout(opts: &CheckoutOptions, cwd: &Path) -> Result<CheckoutSpec> {
    let dir = opts
        .root
        .as_ref()
        .map(|r| cwd.join(r))
        .unwrap_or_else(|| cwd.to_path_buf());

    if let (Some(clone_url), Some(commit_id), Some(vcs)) =
        (&opts.clone_url, &opts.commit_id, &opts.vcs)
    {
        return Ok(CheckoutSpec {
            root: dir,
            clone_url: clone_url.clone(),
            commit_id: commit_id.clone(),
            vcs: vcs.clone(),
        });
    }

    let detected = detect(&dir).with_context(|| {
        format!("failed to detect repository information at {}", dir.display())
    })?;
    tracing::debug!(
        "Detected {} checkout at {} ({})",
        detected.vcs,
        detected.root.display(),
        detected.commit_id
    );

    Ok(CheckoutSpec {
        root: if opts.root.is_some() { dir } else { detected.root },
        clone_url: opts.clone_url.clone().unwrap_or(detected.clone_url),
        commit_id: opts.commit_id.clone().unwrap_or(detected.commit_id),
        vcs: opts.vcs.clone().unwrap_or_else(|| detected.vcs.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::git_repo;

    #[test]
    fn test_explicit_values_skip_detection() {
        let tmp = tempfile::TempDir::new().unwrap();
        let opts = CheckoutOptions {
            root: Some(tmp.path().to_path_buf()),
            clone_url: Some("https://example.com/app.git".to_string()),
            commit_id: Some("abc".to_string()),
            vcs: Some("git".to_string()),
        };

        let spec = resolve_checkout(&opts, Path::new("/")).unwrap();
        assert_eq!(spec.root, tmp.path());
        assert_eq!(spec.commit_id, "abc");
        assert_eq!(spec.uri(), "example.com/app");
    }

    #[test]
    fn test_missing_values_detected() {
        let (tmp, commit) = git_repo(&[("main.go", "package main\n")]);
        let opts = CheckoutOptions {
            root: Some(tmp.path().to_path_buf()),
            clone_url: Some("https://example.com/app.git".to_string()),
            ..Default::default()
        };

        let spec = resolve_checkout(&opts, Path::new("/")).unwrap();
        assert_eq!(spec.commit_id, commit);
        assert_eq!(spec.vcs, "git");
        assert_eq!(spec.clone_url, "https://example.com/app.git");
    }
}
