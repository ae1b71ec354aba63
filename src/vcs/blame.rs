//! Per-file blame information from git.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{BlameOptions, Oid, Repository};
use serde::{Deserialize, Serialize};

use crate::util::fs::slash_path;

/// Path fragments of generated, vendored or binary files that are not blamed.
const BLAME_IGNORES: &[&str] = &[
    "node_modules",
    "bower_components",
    "doc",
    "docs",
    "build",
    "vendor",
    ".min.js",
    "-min.js",
    ".optimized.js",
    "-optimized.js",
    "dist",
    "assets",
    "deps/",
    "dep/",
    ".jar",
    ".png",
    ".html",
    "third-party",
];

/// Author of a blamed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub author: Author,
}

/// A run of lines last changed by one commit. Lines are 1-based, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub commit_id: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameOutput {
    pub commit_map: BTreeMap<String, Commit>,
    pub hunk_map: BTreeMap<String, Vec<Hunk>>,
}

/// Whether `path` matches the blame ignore list.
pub fn is_blame_ignored(path: &Path) -> bool {
    let path = slash_path(path);
    let segments: Vec<&str> = path.split('/').collect();

    BLAME_IGNORES.iter().any(|pattern| {
        if pattern.contains(['.', '/', '-']) {
            path.contains(pattern)
        } else {
            segments.contains(pattern)
        }
    })
}

/// Blame `files` (relative to `root`) as of `commit_id`.
///
/// With `skip` set, an empty output is returned without touching the
/// repository.
pub fn blame_files(
    root: &Path,
    files: &[PathBuf],
    commit_id: &str,
    skip: bool,
) -> Result<BlameOutput> {
    if skip {
        tracing::info!("Skipping VCS blame (returning empty output)");
        return Ok(BlameOutput::default());
    }

    let repo = Repository::open(root)
        .with_context(|| format!("failed to open git repository at {}", root.display()))?;
    let newest = Oid::from_str(commit_id)
        .with_context(|| format!("invalid commit id `{}`", commit_id))?;

    let mut output = BlameOutput::default();
    for file in files {
        if is_blame_ignored(file) {
            tracing::debug!("Not blaming ignored file {}", file.display());
            continue;
        }

        let mut opts = BlameOptions::new();
        opts.newest_commit(newest);
        let blame = repo
            .blame_file(file, Some(&mut opts))
            .with_context(|| format!("failed to blame {}", file.display()))?;

        let mut hunks = Vec::new();
        for hunk in blame.iter() {
            let commit_id = hunk.final_commit_id();
            let start_line = hunk.final_start_line();
            hunks.push(Hunk {
                commit_id: commit_id.to_string(),
                start_line,
                end_line: start_line + hunk.lines_in_hunk().saturating_sub(1),
            });

            if !output.commit_map.contains_key(&commit_id.to_string()) {
                let commit = repo.find_commit(commit_id)?;
                let author = commit.author();
                output.commit_map.insert(
                    commit_id.to_string(),
                    Commit {
                        id: commit_id.to_string(),
                        author: Author {
                            name: author.name().unwrap_or_default().to_string(),
                            email: author.email().unwrap_or_default().to_string(),
                            time: author.when().seconds(),
                        },
                    },
                );
            }
        }
        output.hunk_map.insert(slash_path(file), hunks);
    }

    Ok(output)
}
