//! Core data structures for srcgraph.
//!
//! This module contains the foundational types used throughout srcgraph:
//! - Source units and their kinds
//! - Raw and resolved dependencies
//! - Repository configuration
//! - The toolchain registry and environment

pub mod dependency;
pub mod environment;
pub mod registry;
pub mod repository;
pub mod unit;

pub use dependency::{DependencyKind, RawDependency, ResolvedDependency, ResolvedTarget};
pub use environment::Environment;
pub use registry::{Registry, RegistryError};
pub use repository::{RepositoryConfig, VcsKind};
pub use unit::{SourceUnit, UnitKind};
