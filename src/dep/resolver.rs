//! Dependency resolution through the registry.

use rayon::prelude::*;

use crate::core::dependency::{RawDependency, ResolvedDependency, ResolvedTarget};
use crate::core::registry::Registry;
use crate::core::repository::RepositoryConfig;
use crate::dep::errors::ResolveError;

/// Resolve one raw dependency with the resolver registered for its kind.
pub fn resolve(
    registry: &Registry,
    dep: &RawDependency,
    config: &RepositoryConfig,
) -> Result<Option<ResolvedTarget>, ResolveError> {
    let resolver = registry.resolver_for(&dep.target_kind)?;
    let target = resolver.resolve(dep, config)?;

    match &target {
        Some(t) if t.is_local() => tracing::debug!("{} -> local unit {}", dep, t.to_unit),
        Some(t) => tracing::debug!("{} -> {} {}", dep, t.to_repo_clone_url, t.to_unit),
        None => tracing::debug!("{} -> no target", dep),
    }

    Ok(target)
}

/// Resolve a unit's dependencies in parallel, preserving input order.
///
/// If any dependency fails to resolve, one of the errors is returned.
pub fn resolve_all(
    registry: &Registry,
    deps: &[RawDependency],
    config: &RepositoryConfig,
) -> Result<Vec<ResolvedDependency>, ResolveError> {
    deps.par_iter()
        .map(|dep| {
            resolve(registry, dep, config).map(|target| ResolvedDependency {
                raw: dep.clone(),
                target,
            })
        })
        .collect()
}
