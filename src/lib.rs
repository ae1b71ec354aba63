//! srcgraph - incremental source analysis builds
//!
//! This crate splits a repository into source units, lists and resolves
//! each unit's dependencies, and runs the analysis phases as a
//! dependency-ordered, incremental build graph.

pub mod builder;
pub mod core;
pub mod dep;
pub mod ops;
pub mod scan;
pub mod sources;
pub mod toolchain;
pub mod util;
pub mod vcs;

/// Test utilities and mocks for srcgraph unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildPlan, BuildRule, ExecError, PlanError};
pub use core::{
    dependency::{RawDependency, ResolvedDependency, ResolvedTarget},
    environment::Environment,
    registry::Registry,
    repository::RepositoryConfig,
    unit::SourceUnit,
};
pub use util::context::GlobalContext;
