//! Detect the repository root, commit and clone URL of a checkout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::Repository;

use crate::core::repository::VcsKind;
use crate::util::process::{find_executable, ProcessBuilder};

/// What the VCS knows about a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub root: PathBuf,
    pub vcs: VcsKind,
    pub commit_id: String,
    /// Empty when the repository has no default remote
    pub clone_url: String,
}

/// Find the checkout containing `dir`, trying git first and then hg.
pub fn detect(dir: &Path) -> Result<Checkout> {
    match detect_git(dir) {
        Ok(checkout) => return Ok(checkout),
        Err(e) => tracing::debug!("Not a git checkout: {:#}", e),
    }

    if find_executable("hg").is_some() {
        if let Ok(checkout) = detect_hg(dir) {
            return Ok(checkout);
        }
    }

    bail!(
        "could not detect a git or hg repository at {} (pass --root, --vcs, --cloneurl and --commit)",
        dir.display()
    )
}

pub fn detect_git(dir: &Path) -> Result<Checkout> {
    let repo = Repository::discover(dir)
        .with_context(|| format!("no git repository at {}", dir.display()))?;

    let root = repo
        .workdir()
        .context("bare git repositories are not supported")?
        .to_path_buf();

    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .context("failed to resolve HEAD commit")?;

    let clone_url = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string))
        .unwrap_or_default();

    Ok(Checkout {
        root,
        vcs: VcsKind::Git,
        commit_id: commit.id().to_string(),
        clone_url,
    })
}

pub fn detect_hg(dir: &Path) -> Result<Checkout> {
    let hg = |args: &[&str]| -> Result<String> {
        let out = ProcessBuilder::new("hg").args(args).cwd(dir).exec_and_check()?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    };

    let root = PathBuf::from(hg(&["root"])?);
    let commit_id = hg(&["identify", "--debug", "-i"])?
        .trim_end_matches('+')
        .to_string();
    let clone_url = hg(&["paths", "default"]).unwrap_or_default();

    Ok(Checkout {
        root,
        vcs: VcsKind::Hg,
        commit_id,
        clone_url,
    })
}
