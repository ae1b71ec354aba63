//! Source units - the logical build targets found in a repository.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Toolchain identity of a source unit (e.g. `GoPackage`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKind(String);

impl UnitKind {
    pub fn new(kind: impl Into<String>) -> Self {
        UnitKind(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitKind {
    fn from(s: &str) -> Self {
        UnitKind::new(s)
    }
}

/// A named, typed collection of files forming one build target.
///
/// Units are produced by the scan phase and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Identity, unique within the repository for this kind
    pub name: String,

    /// Toolchain identity
    pub kind: UnitKind,

    /// Root directory, relative to the repository root
    pub dir: PathBuf,

    /// Files, relative to the repository root, in scan order
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, kind: UnitKind, dir: impl Into<PathBuf>) -> Self {
        SourceUnit {
            name: name.into(),
            kind,
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Repository-unique identifier combining name and kind.
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.kind)
    }

    /// Path of this unit's build artifacts below a per-commit build directory.
    ///
    /// The root unit `.` is stored under `_`.
    pub fn artifact_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(self.kind.as_str());
        if self.name == "." || self.name.is_empty() {
            dir.push("_");
        } else {
            dir.extend(self.name.split('/').filter(|s| !s.is_empty() && *s != ".."));
        }
        dir
    }
}
