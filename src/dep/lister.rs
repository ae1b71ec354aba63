//! Dependency listing.
//!
//! Listers emit one identity per line. The shared transform turns that into
//! an ordered, duplicate-free JSON list of raw dependencies.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::builder::container::ContainerRuntime;
use crate::core::dependency::{DependencyKind, RawDependency};
use crate::core::registry::Registry;
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::dep::errors::ListError;

/// Split tool output into raw dependencies.
///
/// Lines are trimmed, blank lines dropped, and only the first occurrence of
/// each identity is kept.
pub fn dedup_raw_dependencies(output: &[u8], kind: &DependencyKind) -> Vec<RawDependency> {
    let text = String::from_utf8_lossy(output);
    let mut seen = HashSet::new();

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(|line| RawDependency::new(kind.clone(), line))
        .collect()
}

/// Transform for line-oriented listers: output lines to serialized raw deps.
pub fn line_transform(kind: DependencyKind) -> impl Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync {
    move |output: &[u8]| {
        let deps = dedup_raw_dependencies(output, &kind);
        Ok(serde_json::to_vec(&deps)?)
    }
}

/// Decode a serialized raw dependency list.
pub fn decode_raw_dependencies(unit: &SourceUnit, data: &[u8]) -> Result<Vec<RawDependency>, ListError> {
    serde_json::from_slice(data).map_err(|source| ListError::Decode {
        unit: unit.id(),
        source,
    })
}

/// Run the registered lister for `unit` and return its raw dependencies.
pub fn list(
    registry: &Registry,
    runtime: &dyn ContainerRuntime,
    dir: &Path,
    unit: &SourceUnit,
    config: &RepositoryConfig,
) -> Result<Vec<RawDependency>, ListError> {
    let output = run_lister(registry, runtime, dir, unit, config)?;
    decode_raw_dependencies(unit, &output)
}

/// Run the registered lister for `unit`, returning the transformed bytes.
pub fn run_lister(
    registry: &Registry,
    runtime: &dyn ContainerRuntime,
    dir: &Path,
    unit: &SourceUnit,
    config: &RepositoryConfig,
) -> Result<Vec<u8>, ListError> {
    let lister = registry.lister_for(unit)?;
    let command = lister
        .build_lister(dir, unit, config)
        .map_err(|source| ListError::Build {
            unit: unit.id(),
            source,
        })?;

    tracing::debug!("Listing dependencies of {}", unit.id());

    command.run(runtime).map_err(|source| ListError::Command {
        unit: unit.id(),
        source,
    })
}
