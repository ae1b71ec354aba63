//! Raw and resolved dependencies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::unit::UnitKind;

/// Kind of a raw dependency's target identity (e.g. `go-import-path`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyKind(String);

impl DependencyKind {
    pub fn new(kind: impl Into<String>) -> Self {
        DependencyKind(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DependencyKind {
    fn from(s: &str) -> Self {
        DependencyKind::new(s)
    }
}

/// An unresolved, toolchain-native reference found in one unit.
///
/// `target` is opaque to everything but the toolchain that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDependency {
    pub target_kind: DependencyKind,
    pub target: serde_json::Value,
}

impl RawDependency {
    pub fn new(target_kind: DependencyKind, target: impl Into<serde_json::Value>) -> Self {
        RawDependency {
            target_kind,
            target: target.into(),
        }
    }

    /// The target as a string, if the toolchain uses string identities.
    pub fn target_str(&self) -> Option<&str> {
        self.target.as_str()
    }
}

impl fmt::Display for RawDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target.as_str() {
            Some(s) => write!(f, "{} ({})", s, self.target_kind),
            None => write!(f, "{} ({})", self.target, self.target_kind),
        }
    }
}

/// A fully qualified pointer to the unit that satisfies a raw dependency.
///
/// An empty clone URL means the target lives in the repository being built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTarget {
    #[serde(rename = "toRepoCloneURL")]
    pub to_repo_clone_url: String,
    pub to_unit: String,
    pub to_unit_kind: UnitKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_version_string: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_rev_spec: String,
}

impl ResolvedTarget {
    /// Whether the target is in the same repository.
    pub fn is_local(&self) -> bool {
        self.to_repo_clone_url.is_empty()
    }
}

/// One record of the resolve-deps phase output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub raw: RawDependency,
    /// None for pseudo-dependencies with no real target
    pub target: Option<ResolvedTarget>,
}
