//! Repository scanning - produces the `RepositoryConfig` a build is planned from.
//!
//! The scanned configuration combines:
//! - an optional `Srcgraph.toml` at the repository root
//! - the units found by every registered toolchain scanner
//!
//! Namespace precedence: `Srcgraph.toml`, then toolchain metadata (for
//! example a `go.mod` module line), then the repository URI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::registry::UnitScanner;
use crate::core::repository::RepositoryConfig;
use crate::core::unit::{SourceUnit, UnitKind};
use crate::util::fs::read_to_string;

/// Repository configuration file name.
pub const REPO_CONFIG_FILE: &str = "Srcgraph.toml";

/// Produces the repository configuration for a checkout.
pub trait Scanner: Send + Sync {
    fn scan(&self, root: &Path, repo_uri: &str) -> Result<RepositoryConfig>;
}

/// Contents of `Srcgraph.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoFile {
    /// Namespace override
    pub namespace: Option<String>,

    pub skip_blame: bool,

    /// Units declared by hand
    pub units: Vec<DeclaredUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredUnit {
    pub name: String,
    pub kind: UnitKind,
    pub dir: PathBuf,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl From<DeclaredUnit> for SourceUnit {
    fn from(unit: DeclaredUnit) -> Self {
        SourceUnit::new(unit.name, unit.kind, unit.dir).with_files(unit.files)
    }
}

impl RepoFile {
    /// Load `Srcgraph.toml` from `root`, or defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(REPO_CONFIG_FILE);
        if !path.exists() {
            return Ok(RepoFile::default());
        }

        let contents = read_to_string(&path)?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The repository configuration as declared, before any scanning.
    pub fn into_repository_config(self, repo_uri: &str) -> RepositoryConfig {
        let mut config = RepositoryConfig::new(repo_uri)
            .with_namespace(self.namespace.unwrap_or_default())
            .with_units(self.units.into_iter().map(SourceUnit::from).collect());
        config.skip_blame = self.skip_blame;
        config
    }
}

/// Scans a checkout with the registered toolchain scanners.
pub struct DirScanner {
    scanners: Vec<Arc<dyn UnitScanner>>,
}

impl DirScanner {
    pub fn new(scanners: Vec<Arc<dyn UnitScanner>>) -> Self {
        DirScanner { scanners }
    }

    fn detect_namespace(&self, root: &Path) -> Result<Option<String>> {
        for scanner in &self.scanners {
            if let Some(ns) = scanner.detect_namespace(root)? {
                tracing::debug!("{} scanner detected namespace {}", scanner.kind(), ns);
                return Ok(Some(ns));
            }
        }
        Ok(None)
    }
}

impl Scanner for DirScanner {
    fn scan(&self, root: &Path, repo_uri: &str) -> Result<RepositoryConfig> {
        if !root.is_dir() {
            anyhow::bail!("repository root {} is not a directory", root.display());
        }

        let repo_file = RepoFile::load(root)?;

        // Keyed by (kind, name) so declared units replace scanned ones.
        let mut units: BTreeMap<(UnitKind, String), SourceUnit> = BTreeMap::new();
        for scanner in &self.scanners {
            let found = scanner
                .scan_units(root)
                .with_context(|| format!("{} scanner failed", scanner.kind()))?;
            for unit in found {
                units.insert((unit.kind.clone(), unit.name.clone()), unit);
            }
        }
        for declared in repo_file.units {
            let unit = SourceUnit::from(declared);
            units.insert((unit.kind.clone(), unit.name.clone()), unit);
        }

        let namespace = match repo_file.namespace {
            Some(ns) => ns,
            None => self
                .detect_namespace(root)?
                .unwrap_or_else(|| repo_uri.to_string()),
        };

        tracing::info!(
            "Scanned {}: {} unit(s), namespace {}",
            root.display(),
            units.len(),
            if namespace.is_empty() { "<none>" } else { namespace.as_str() }
        );

        let mut config = RepositoryConfig::new(repo_uri)
            .with_namespace(namespace)
            .with_units(units.into_values().collect());
        config.skip_blame = repo_file.skip_blame;
        Ok(config)
    }
}
