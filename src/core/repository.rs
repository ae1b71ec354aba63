//! Repository-level configuration shared by every rule of a build.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::unit::SourceUnit;

/// Matches scp-style clone URLs such as `git@github.com:user/repo.git`.
static SCP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@([A-Za-z0-9.-]+):(.+)$").expect("valid scp url regex")
});

/// Version control system of the repository being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    Hg,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown VCS type `{0}` (expected `git` or `hg`)")]
pub struct UnknownVcs(pub String);

impl FromStr for VcsKind {
    type Err = UnknownVcs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(VcsKind::Git),
            "hg" => Ok(VcsKind::Hg),
            other => Err(UnknownVcs(other.to_string())),
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Hg => write!(f, "hg"),
        }
    }
}

/// Resolved per-repository settings and the units found by scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository URI (e.g. `github.com/alice/foo`)
    pub uri: String,

    /// Declared namespace prefix; dependencies under it are internal
    #[serde(default)]
    pub namespace: String,

    /// Skip VCS blame for this repository
    #[serde(default)]
    pub skip_blame: bool,

    /// Units discovered by the scan phase
    #[serde(default)]
    pub source_units: Vec<SourceUnit>,
}

impl RepositoryConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        RepositoryConfig {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_units(mut self, units: Vec<SourceUnit>) -> Self {
        self.source_units = units;
        self
    }

    /// Path of `identity` relative to the namespace, if it lies under it.
    ///
    /// Matching is per path segment: `example.com/app` contains
    /// `example.com/app/util` but not `example.com/application`.
    pub fn namespace_relative<'a>(&self, identity: &'a str) -> Option<&'a str> {
        let ns = self.namespace.trim_end_matches('/');
        if ns.is_empty() {
            return None;
        }
        if identity == ns {
            return Some(".");
        }
        identity
            .strip_prefix(ns)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }
}

/// Derive a repository URI from a clone URL.
///
/// `https://github.com/alice/foo.git`, `git://github.com/alice/foo` and
/// `git@github.com:alice/foo.git` all map to `github.com/alice/foo`.
pub fn repo_uri(clone_url: &str) -> String {
    let clone_url = clone_url.trim();

    if let Some(caps) = SCP_URL.captures(clone_url) {
        return join_uri(&caps[1], &caps[2]);
    }

    if let Ok(url) = Url::parse(clone_url) {
        if let Some(host) = url.host_str() {
            return join_uri(host, url.path());
        }
        return trim_repo_path(url.path()).to_string();
    }

    trim_repo_path(clone_url).to_string()
}

fn join_uri(host: &str, path: &str) -> String {
    let path = trim_repo_path(path);
    if path.is_empty() {
        host.to_ascii_lowercase()
    } else {
        format!("{}/{}", host.to_ascii_lowercase(), path)
    }
}

fn trim_repo_path(path: &str) -> &str {
    let path = path.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_uri() {
        assert_eq!(repo_uri("https://github.com/alice/foo.git"), "github.com/alice/foo");
        assert_eq!(repo_uri("git://github.com/alice/foo"), "github.com/alice/foo");
        assert_eq!(repo_uri("git@github.com:alice/foo.git"), "github.com/alice/foo");
        assert_eq!(repo_uri("https://GitHub.com/alice/foo/"), "github.com/alice/foo");
        assert_eq!(repo_uri(""), "");
    }

    #[test]
    fn test_vcs_kind_parse() {
        assert_eq!("git".parse::<VcsKind>(), Ok(VcsKind::Git));
        assert_eq!("hg".parse::<VcsKind>(), Ok(VcsKind::Hg));
        assert_eq!(
            "svn".parse::<VcsKind>(),
            Err(UnknownVcs("svn".to_string()))
        );
    }

    #[test]
    fn test_namespace_relative() {
        let config = RepositoryConfig::new("example.com/app").with_namespace("example.com/app");
        assert_eq!(config.namespace_relative("example.com/app/util"), Some("util"));
        assert_eq!(config.namespace_relative("example.com/app/a/b"), Some("a/b"));
        assert_eq!(config.namespace_relative("example.com/app"), Some("."));
        assert_eq!(config.namespace_relative("example.com/application"), None);
        assert_eq!(config.namespace_relative("fmt"), None);
    }

    #[test]
    fn test_empty_namespace_matches_nothing() {
        let config = RepositoryConfig::new("x");
        assert_eq!(config.namespace_relative("anything"), None);
    }
}
