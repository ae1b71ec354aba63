//! Rule actions for each analysis phase.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::builder::container::{ContainerCommand, ContainerRuntime};
use crate::builder::plan::{Action, ActionContext};
use crate::core::dependency::RawDependency;
use crate::core::registry::{Grapher, Registry};
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::dep::resolver::resolve_all;
use crate::vcs::blame::blame_files;

/// Runs a unit's lister command.
pub struct ListDepsAction {
    command: ContainerCommand,
    runtime: Arc<dyn ContainerRuntime>,
}

impl ListDepsAction {
    pub fn new(command: ContainerCommand, runtime: Arc<dyn ContainerRuntime>) -> Self {
        ListDepsAction { command, runtime }
    }
}

impl Action for ListDepsAction {
    fn describe(&self) -> String {
        match self.runtime.invocation(&self.command) {
            Ok(process) => process.display_command(),
            Err(e) => format!("<invalid command: {}>", e),
        }
    }

    fn run(&self, _ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        Ok(self.command.run(self.runtime.as_ref())?)
    }
}

/// Resolves the raw dependencies listed by the unit's list-deps rule.
pub struct ResolveDepsAction {
    registry: Arc<Registry>,
    repo: Arc<RepositoryConfig>,
    unit: SourceUnit,
}

impl ResolveDepsAction {
    pub fn new(registry: Arc<Registry>, repo: Arc<RepositoryConfig>, unit: SourceUnit) -> Self {
        ResolveDepsAction {
            registry,
            repo,
            unit,
        }
    }
}

impl Action for ResolveDepsAction {
    fn describe(&self) -> String {
        let settings = self.registry.resolver_settings();
        if settings.is_empty() {
            format!("resolve-deps {}", self.unit.id())
        } else {
            format!("resolve-deps {} with {}", self.unit.id(), settings)
        }
    }

    fn run(&self, ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        let Some(input) = ctx.inputs.first() else {
            bail!("resolve-deps {} has no dependency list input", self.unit.id());
        };

        let data = std::fs::read(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let raw: Vec<RawDependency> = serde_json::from_slice(&data)
            .with_context(|| format!("malformed dependency list {}", input.display()))?;

        tracing::debug!("Resolving {} dependencies of {}", raw.len(), self.unit.id());
        let resolved = resolve_all(&self.registry, &raw, &self.repo)
            .with_context(|| format!("failed to resolve dependencies of {}", self.unit.id()))?;

        Ok(serde_json::to_vec_pretty(&resolved)?)
    }
}

/// Extracts symbols and references with the unit kind's grapher.
pub struct GraphAction {
    grapher: Arc<dyn Grapher>,
    repo: Arc<RepositoryConfig>,
    unit: SourceUnit,
}

impl GraphAction {
    pub fn new(grapher: Arc<dyn Grapher>, repo: Arc<RepositoryConfig>, unit: SourceUnit) -> Self {
        GraphAction {
            grapher,
            repo,
            unit,
        }
    }
}

impl Action for GraphAction {
    fn describe(&self) -> String {
        format!("graph {}", self.unit.id())
    }

    fn run(&self, ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        let output = self
            .grapher
            .graph(ctx.root_dir, &self.unit, &self.repo)
            .with_context(|| format!("failed to graph {}", self.unit.id()))?;
        Ok(serde_json::to_vec_pretty(&output)?)
    }
}

/// Blames the unit's files at the build commit.
pub struct BlameAction {
    unit: SourceUnit,
    commit_id: String,
    skip: bool,
}

impl BlameAction {
    pub fn new(unit: SourceUnit, commit_id: String, skip: bool) -> Self {
        BlameAction {
            unit,
            commit_id,
            skip,
        }
    }
}

impl Action for BlameAction {
    fn describe(&self) -> String {
        let mut desc = format!("blame {} at {}", self.unit.id(), self.commit_id);
        if self.skip {
            desc.push_str(" (skipped)");
        }
        desc
    }

    fn run(&self, ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        let output = blame_files(ctx.root_dir, &self.unit.files, &self.commit_id, self.skip)?;
        Ok(serde_json::to_vec_pretty(&output)?)
    }
}

/// Stands in for an action that could not be constructed at plan time.
pub struct FailedAction {
    description: String,
    message: String,
}

impl FailedAction {
    pub fn new(description: impl Into<String>, message: impl Into<String>) -> Self {
        FailedAction {
            description: description.into(),
            message: message.into(),
        }
    }
}

impl Action for FailedAction {
    fn describe(&self) -> String {
        format!("{} (error: {})", self.description, self.message)
    }

    fn run(&self, _ctx: &ActionContext<'_>) -> Result<Vec<u8>> {
        bail!("{}", self.message)
    }
}
