//! Go import path resolution.
//!
//! Policy, in order:
//! 1. paths under the repository namespace resolve to local units (uncached)
//! 2. cached outcomes are returned unchanged
//! 3. `C` (cgo) resolves to no target
//! 4. standard library paths resolve into the Go distribution
//! 5. anything else is looked up remotely

use crate::core::dependency::{RawDependency, ResolvedTarget};
use crate::core::registry::Resolver;
use crate::core::repository::RepositoryConfig;
use crate::core::unit::UnitKind;
use crate::dep::cache::CachedResolution;
use crate::dep::errors::ResolveError;
use crate::toolchain::golang::{stdlib, GoToolchain, GO_PACKAGE};

/// Import path of the cgo pseudo-package.
const CGO_PSEUDO_PACKAGE: &str = "C";

impl GoToolchain {
    /// Strip the legacy base import path prefix.
    pub fn normalize<'a>(&self, import_path: &'a str) -> &'a str {
        let base = self.base_import_path.trim_end_matches('/');
        if base.is_empty() {
            return import_path;
        }
        import_path
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(import_path)
    }

    fn resolve_import_path(
        &self,
        import_path: &str,
        config: &RepositoryConfig,
    ) -> Result<Option<ResolvedTarget>, ResolveError> {
        let import_path = self.normalize(import_path);

        if let Some(unit) = config.namespace_relative(import_path) {
            return Ok(Some(ResolvedTarget {
                to_repo_clone_url: String::new(),
                to_unit: unit.to_string(),
                to_unit_kind: UnitKind::new(GO_PACKAGE),
                ..Default::default()
            }));
        }

        self.cache
            .get_or_try_insert_with(import_path, || self.resolve_external(import_path))
    }

    fn resolve_external(&self, import_path: &str) -> Result<CachedResolution, ResolveError> {
        if import_path == CGO_PSEUDO_PACKAGE {
            return Ok(None);
        }

        if stdlib::is_standard_package(import_path) {
            return Ok(Some(self.standard_target(import_path)));
        }

        tracing::debug!("Fetching metadata for {}", import_path);
        let info = self
            .metadata
            .lookup(import_path)
            .map_err(|source| ResolveError::Lookup {
                identity: import_path.to_string(),
                source,
            })?;

        let unit = relative_import_path(&info.project_root, &info.import_path).ok_or_else(|| {
            ResolveError::OutsideProjectRoot {
                identity: info.import_path.clone(),
                root: info.project_root.clone(),
            }
        })?;

        let mut target = ResolvedTarget {
            to_repo_clone_url: info.project_url.trim_end_matches('/').to_string(),
            to_unit: unit,
            to_unit_kind: UnitKind::new(GO_PACKAGE),
            ..Default::default()
        };

        // Aliases of standard library packages keep the discovered project
        // but are pinned to the configured distribution.
        if stdlib::is_standard_package(&info.import_path) {
            target.to_version_string = self.version.clone();
            target.to_rev_spec = self.revision.clone();
        }

        Ok(Some(target))
    }

    fn standard_target(&self, import_path: &str) -> ResolvedTarget {
        ResolvedTarget {
            to_repo_clone_url: self.clone_url.clone(),
            to_unit: stdlib::unit_path(import_path),
            to_unit_kind: UnitKind::new(GO_PACKAGE),
            to_version_string: self.version.clone(),
            to_rev_spec: self.revision.clone(),
        }
    }
}

impl Resolver for GoToolchain {
    fn resolve(
        &self,
        dep: &RawDependency,
        config: &RepositoryConfig,
    ) -> Result<Option<ResolvedTarget>, ResolveError> {
        let import_path = dep
            .target_str()
            .ok_or_else(|| ResolveError::MalformedIdentity {
                identity: dep.target.to_string(),
                expected: "a Go import path string",
            })?;
        self.resolve_import_path(import_path, config)
    }

    fn settings(&self) -> String {
        format!(
            "version={} revision={} cloneurl={} base={}",
            self.version, self.revision, self.clone_url, self.base_import_path
        )
    }
}

/// `import_path` relative to `root`, `.` when they are equal.
fn relative_import_path(root: &str, import_path: &str) -> Option<String> {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Some(import_path.to_string());
    }
    if import_path == root {
        return Some(".".to_string());
    }
    import_path
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}
