//! Implementation of `srcgraph scan`, `list-deps`, `resolve-deps` and
//! `graph`: single phases run outside the build graph.

use anyhow::{bail, Context, Result};

use crate::core::dependency::{RawDependency, ResolvedDependency};
use crate::core::environment::Environment;
use crate::core::registry::GraphOutput;
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::dep::{lister, resolve_all};
use crate::ops::checkout::CheckoutSpec;
use crate::scan::RepoFile;
use crate::util::config::Config;

/// Scan a checkout into its repository configuration.
pub fn scan(checkout: &CheckoutSpec, env: &Environment, config: &Config) -> Result<RepositoryConfig> {
    let mut repo = env
        .scanner
        .scan(&checkout.root, &checkout.uri())
        .with_context(|| format!("failed to scan {}", checkout.root.display()))?;
    if config.skip_blame() {
        repo.skip_blame = true;
    }
    Ok(repo)
}

/// Repository configuration of a checkout.
///
/// With `finalize`, the declared configuration is completed by scanning;
/// otherwise only `Srcgraph.toml` is read and validated.
pub fn repository_config(
    checkout: &CheckoutSpec,
    env: &Environment,
    config: &Config,
    finalize: bool,
) -> Result<RepositoryConfig> {
    if finalize {
        return scan(checkout, env, config);
    }
    let file = RepoFile::load(&checkout.root)
        .with_context(|| format!("invalid configuration in {}", checkout.root.display()))?;
    Ok(file.into_repository_config(&checkout.uri()))
}

/// Units of `repo` selected by name; all units when `names` is empty.
pub fn select_units<'a>(repo: &'a RepositoryConfig, names: &[String]) -> Result<Vec<&'a SourceUnit>> {
    if names.is_empty() {
        return Ok(repo.source_units.iter().collect());
    }

    let mut selected = Vec::new();
    for name in names {
        let matches: Vec<_> = repo.source_units.iter().filter(|u| &u.name == name).collect();
        if matches.is_empty() {
            let available: Vec<_> = repo.source_units.iter().map(|u| u.name.as_str()).collect();
            bail!(
                "unknown source unit `{}`\navailable units: {}",
                name,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                }
            );
        }
        selected.extend(matches);
    }
    Ok(selected)
}

/// Raw dependencies of one unit.
pub fn list_deps(
    checkout: &CheckoutSpec,
    env: &Environment,
    repo: &RepositoryConfig,
    unit: &SourceUnit,
) -> Result<Vec<RawDependency>> {
    Ok(lister::list(
        &env.registry,
        env.runtime.as_ref(),
        &checkout.root,
        unit,
        repo,
    )?)
}

/// Raw dependencies of one unit, resolved.
pub fn resolve_deps(
    checkout: &CheckoutSpec,
    env: &Environment,
    repo: &RepositoryConfig,
    unit: &SourceUnit,
) -> Result<Vec<ResolvedDependency>> {
    let raw = list_deps(checkout, env, repo, unit)?;
    resolve_all(&env.registry, &raw, repo)
        .with_context(|| format!("failed to resolve dependencies of {}", unit.id()))
}

/// Symbols and references of one unit.
pub fn graph(
    checkout: &CheckoutSpec,
    env: &Environment,
    repo: &RepositoryConfig,
    unit: &SourceUnit,
) -> Result<GraphOutput> {
    let grapher = env.registry.grapher_for(&unit.kind)?;
    grapher
        .graph(&checkout.root, unit, repo)
        .with_context(|| format!("failed to graph {}", unit.id()))
}
