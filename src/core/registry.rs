//! Toolchain registry - kind-keyed dispatch to listers, resolvers and graphers.
//!
//! Each toolchain plugin registers its capabilities on a `RegistryBuilder`
//! once at startup. The built `Registry` is immutable and shared read-only
//! by every plan and rule execution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::container::ContainerCommand;
use crate::core::dependency::{DependencyKind, RawDependency, ResolvedTarget};
use crate::core::repository::RepositoryConfig;
use crate::core::unit::{SourceUnit, UnitKind};
use crate::dep::errors::ResolveError;

/// Lookup of a kind nobody registered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no dependency lister registered for source unit kind `{0}`")]
    NoLister(UnitKind),

    #[error("no dependency resolver registered for dependency kind `{0}`")]
    NoResolver(DependencyKind),

    #[error("no grapher registered for source unit kind `{0}`")]
    NoGrapher(UnitKind),
}

/// Builds the command that enumerates a unit's raw dependencies.
pub trait Lister: Send + Sync {
    /// `dir` is the repository root on the host.
    fn build_lister(
        &self,
        dir: &Path,
        unit: &SourceUnit,
        config: &RepositoryConfig,
    ) -> Result<ContainerCommand>;
}

/// Maps raw dependencies of one kind to resolved targets.
pub trait Resolver: Send + Sync {
    /// `Ok(None)` means the dependency is a pseudo-dependency with no target.
    fn resolve(
        &self,
        dep: &RawDependency,
        config: &RepositoryConfig,
    ) -> Result<Option<ResolvedTarget>, ResolveError>;

    /// Settings that change resolution outcomes. Empty when there are none.
    fn settings(&self) -> String {
        String::new()
    }
}

/// Symbols, references and docs extracted from one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphOutput {
    #[serde(default)]
    pub symbols: Vec<serde_json::Value>,
    #[serde(default)]
    pub refs: Vec<serde_json::Value>,
    #[serde(default)]
    pub docs: Vec<serde_json::Value>,
}

/// Per-toolchain symbol/reference analyzer.
pub trait Grapher: Send + Sync {
    fn graph(&self, dir: &Path, unit: &SourceUnit, config: &RepositoryConfig)
        -> Result<GraphOutput>;
}

/// Finds the units of one toolchain in a repository.
pub trait UnitScanner: Send + Sync {
    fn kind(&self) -> UnitKind;

    fn scan_units(&self, dir: &Path) -> Result<Vec<SourceUnit>>;

    /// Namespace declared by the toolchain's own metadata, if any.
    fn detect_namespace(&self, _dir: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Immutable kind-keyed capability tables.
#[derive(Default, Clone)]
pub struct Registry {
    listers: HashMap<UnitKind, Arc<dyn Lister>>,
    resolvers: HashMap<DependencyKind, Arc<dyn Resolver>>,
    graphers: HashMap<UnitKind, Arc<dyn Grapher>>,
    scanners: Vec<Arc<dyn UnitScanner>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Lister for the unit's kind.
    pub fn lister_for(&self, unit: &SourceUnit) -> Result<Arc<dyn Lister>, RegistryError> {
        self.listers
            .get(&unit.kind)
            .cloned()
            .ok_or_else(|| RegistryError::NoLister(unit.kind.clone()))
    }

    /// Resolver for a dependency kind.
    pub fn resolver_for(
        &self,
        kind: &DependencyKind,
    ) -> Result<Arc<dyn Resolver>, RegistryError> {
        self.resolvers
            .get(kind)
            .cloned()
            .ok_or_else(|| RegistryError::NoResolver(kind.clone()))
    }

    /// Grapher for a unit kind.
    pub fn grapher_for(&self, kind: &UnitKind) -> Result<Arc<dyn Grapher>, RegistryError> {
        self.graphers
            .get(kind)
            .cloned()
            .ok_or_else(|| RegistryError::NoGrapher(kind.clone()))
    }

    /// All registered unit scanners, in registration order.
    pub fn scanners(&self) -> &[Arc<dyn UnitScanner>] {
        &self.scanners
    }

    /// Unit kinds with a registered lister, sorted.
    pub fn lister_kinds(&self) -> Vec<&UnitKind> {
        let mut kinds: Vec<_> = self.listers.keys().collect();
        kinds.sort();
        kinds
    }

    /// Dependency kinds with a registered resolver, sorted.
    pub fn resolver_kinds(&self) -> Vec<&DependencyKind> {
        let mut kinds: Vec<_> = self.resolvers.keys().collect();
        kinds.sort();
        kinds
    }

    /// `kind(settings)` of every resolver with settings, sorted by kind.
    pub fn resolver_settings(&self) -> String {
        self.resolver_kinds()
            .into_iter()
            .filter_map(|kind| {
                let settings = self.resolvers[kind].settings();
                (!settings.is_empty()).then(|| format!("{}({})", kind, settings))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Unit kinds with a registered grapher, sorted.
    pub fn grapher_kinds(&self) -> Vec<&UnitKind> {
        let mut kinds: Vec<_> = self.graphers.keys().collect();
        kinds.sort();
        kinds
    }
}

/// Collects registrations before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Register a lister. Re-registering a kind replaces the previous lister.
    pub fn register_lister(mut self, kind: UnitKind, lister: Arc<dyn Lister>) -> Self {
        self.registry.listers.insert(kind, lister);
        self
    }

    /// Register a resolver. Re-registering a kind replaces the previous one.
    pub fn register_resolver(mut self, kind: DependencyKind, resolver: Arc<dyn Resolver>) -> Self {
        self.registry.resolvers.insert(kind, resolver);
        self
    }

    pub fn register_grapher(mut self, kind: UnitKind, grapher: Arc<dyn Grapher>) -> Self {
        self.registry.graphers.insert(kind, grapher);
        self
    }

    pub fn register_scanner(mut self, scanner: Arc<dyn UnitScanner>) -> Self {
        self.registry.scanners.push(scanner);
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}
