//! Test utilities and mocks for srcgraph unit tests.
//!
//! Stand-ins for the interfaces that reach outside the process: the
//! metadata service, repository scanning and rule actions.

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::builder::plan::{Action, ActionContext};
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::scan::Scanner;
use crate::sources::metadata::{MetadataSource, ProjectInfo};

/// Metadata source answering from a fixed table and counting lookups.
#[derive(Debug, Default)]
pub struct CountingMetadataSource {
    projects: HashMap<String, ProjectInfo>,
    lookups: AtomicUsize,
}

impl CountingMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer lookups of `import_path` with the given project.
    pub fn with_project(self, import_path: &str, project_url: &str, project_root: &str) -> Self {
        self.with_info(
            import_path,
            ProjectInfo {
                project_root: project_root.to_string(),
                project_url: project_url.to_string(),
                import_path: import_path.to_string(),
            },
        )
    }

    /// Answer lookups of `identity` with `info`, whose canonical import
    /// path may differ from the identity asked for.
    pub fn with_info(mut self, identity: &str, info: ProjectInfo) -> Self {
        self.projects.insert(identity.to_string(), info);
        self
    }

    /// Number of lookups served so far, failed ones included.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl MetadataSource for CountingMetadataSource {
    fn lookup(&self, identity: &str) -> Result<ProjectInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.projects.get(identity) {
            Some(info) => Ok(info.clone()),
            None => bail!("no project found for `{}`", identity),
        }
    }
}

/// Scanner returning a fixed unit list.
#[derive(Debug, Clone)]
pub struct StaticScanner {
    units: Vec<SourceUnit>,
}

impl StaticScanner {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        StaticScanner { units }
    }
}

impl Scanner for StaticScanner {
    fn scan(&self, _root: &Path, repo_uri: &str) -> Result<RepositoryConfig> {
        Ok(RepositoryConfig::new(repo_uri)
            .with_namespace(repo_uri)
            .with_units(self.units.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Action that records its invocations and writes its description.
#[derive(Debug)]
pub struct RecordingAction {
    description: String,
    behavior: Behavior,
    pub runs: AtomicUsize,
    inputs: Mutex<Vec<PathBuf>>,
}

impl RecordingAction {
    fn with_behavior(description: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(RecordingAction {
            description: description.to_string(),
            behavior,
            runs: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    /// Succeeds with `description` as output.
    pub fn ok(description: &str) -> Arc<Self> {
        Self::with_behavior(description, Behavior::Succeed)
    }

    /// Always fails with `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_behavior(message, Behavior::Fail)
    }

    /// Always panics with `message`.
    pub fn panicking(message: &str) -> Arc<Self> {
        Self::with_behavior(message, Behavior::Panic)
    }

    /// Inputs seen by the most recent run.
    pub fn last_inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Action for RecordingAction {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn run(&self, ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.inputs.lock().unwrap() = ctx.inputs.clone();
        match self.behavior {
            Behavior::Succeed => Ok(self.description.clone().into_bytes()),
            Behavior::Fail => bail!("{}", self.description),
            Behavior::Panic => panic!("{}", self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_metadata_source() {
        let source = CountingMetadataSource::new().with_project(
            "github.com/foo/bar",
            "https://github.com/foo/bar",
            "github.com/foo/bar",
        );

        assert_eq!(
            source.lookup("github.com/foo/bar").unwrap().project_url,
            "https://github.com/foo/bar"
        );
        assert!(source.lookup("github.com/other").is_err());
        assert_eq!(source.lookups(), 2);
    }

    #[test]
    fn test_static_scanner() {
        let scanner = StaticScanner::new(vec![]);
        let repo = scanner.scan(Path::new("/repo"), "example.com/app").unwrap();
        assert_eq!(repo.namespace, "example.com/app");
        assert!(repo.source_units.is_empty());
    }
}
