//! Build plan generation.
//!
//! A BuildPlan holds one rule per (unit, phase). Each rule has an
//! addressable target file, prerequisites (other rule targets or source
//! files) and an action producing the target's bytes.
//!
//! Targets live at `<work_dir>/<repo-uri>/<commit>/<kind>/<unit>/<phase>.json`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::builder::actions::{
    BlameAction, FailedAction, GraphAction, ListDepsAction, ResolveDepsAction,
};
use crate::core::environment::Environment;
use crate::core::registry::RegistryError;
use crate::core::repository::{repo_uri, RepositoryConfig, UnknownVcs, VcsKind};
use crate::core::unit::SourceUnit;
use crate::util::config::Config;

/// Analysis phases, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    ListDeps,
    ResolveDeps,
    Graph,
    Blame,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::ListDeps => "list-deps",
            Phase::ResolveDeps => "resolve-deps",
            Phase::Graph => "graph",
            Phase::Blame => "blame",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An addressable rule output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Name relative to the build directory, e.g. `GoPackage/util/list-deps.json`
    pub rel_name: String,

    /// Absolute path
    pub path: PathBuf,
}

impl Target {
    /// Target of `phase` for `unit` inside `build_dir`.
    pub fn for_unit(build_dir: &Path, unit: &SourceUnit, phase: Phase) -> Self {
        let rel = unit.artifact_dir().join(phase.file_name());
        Target {
            rel_name: crate::util::fs::slash_path(&rel),
            path: build_dir.join(rel),
        }
    }
}

/// Something a rule needs before it can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// The target of another rule
    Rule(PathBuf),
    /// A file that exists before the build
    File(PathBuf),
}

impl Prerequisite {
    pub fn path(&self) -> &Path {
        match self {
            Prerequisite::Rule(p) | Prerequisite::File(p) => p,
        }
    }
}

/// Inputs handed to a running action.
#[derive(Debug, Clone)]
pub struct ActionContext<'a> {
    /// Repository root
    pub root_dir: &'a Path,

    /// Target being produced
    pub target: &'a Target,

    /// Absolute prerequisite paths, in rule order
    pub inputs: Vec<PathBuf>,
}

/// Produces a rule's target bytes.
pub trait Action: Send + Sync {
    /// One-line description, used for dry runs and fingerprints.
    fn describe(&self) -> String;

    fn run(&self, ctx: &ActionContext<'_>) -> Result<Vec<u8>>;
}

/// A target, what it needs, and how to produce it.
#[derive(Clone)]
pub struct BuildRule {
    pub target: Target,
    pub prerequisites: Vec<Prerequisite>,
    pub action: Arc<dyn Action>,
}

impl fmt::Debug for BuildRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildRule")
            .field("target", &self.target)
            .field("prerequisites", &self.prerequisites)
            .field("action", &self.action.describe())
            .finish()
    }
}

/// A complete build plan.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Repository root
    pub root_dir: PathBuf,

    /// Directory holding all builds; the fingerprint cache lives here
    pub work_dir: PathBuf,

    /// `<work_dir>/<repo-uri>/<commit>`
    pub build_dir: PathBuf,

    pub commit_id: String,

    pub repo: Arc<RepositoryConfig>,

    pub rules: Vec<BuildRule>,
}

/// What to plan.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub root_dir: PathBuf,
    pub clone_url: String,
    pub commit_id: String,
    pub vcs: String,
    /// Directory holding all builds
    pub work_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    UnknownVcs(#[from] UnknownVcs),

    #[error("failed to scan repository: {0:#}")]
    Scan(anyhow::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Scan the repository and construct every rule of its build.
pub fn plan(request: &PlanRequest, env: &Environment, config: &Config) -> Result<BuildPlan, PlanError> {
    let vcs: VcsKind = request.vcs.parse()?;

    let uri = repo_uri(&request.clone_url);
    let mut repo = env
        .scanner
        .scan(&request.root_dir, &uri)
        .map_err(PlanError::Scan)?;
    if config.skip_blame() {
        repo.skip_blame = true;
    }
    let repo = Arc::new(repo);

    let build_dir = request
        .work_dir
        .join(if uri.is_empty() { "_" } else { uri.as_str() })
        .join(&request.commit_id);

    let mut rules = Vec::new();
    for unit in &repo.source_units {
        rules.extend(plan_unit(request, env, &repo, unit, vcs, &build_dir)?);
    }

    tracing::info!(
        "Planned {} rule(s) for {} unit(s) of {}",
        rules.len(),
        repo.source_units.len(),
        if uri.is_empty() { "<local>" } else { uri.as_str() }
    );

    Ok(BuildPlan {
        root_dir: request.root_dir.clone(),
        work_dir: request.work_dir.clone(),
        build_dir,
        commit_id: request.commit_id.clone(),
        repo,
        rules,
    })
}

fn plan_unit(
    request: &PlanRequest,
    env: &Environment,
    repo: &Arc<RepositoryConfig>,
    unit: &SourceUnit,
    vcs: VcsKind,
    build_dir: &Path,
) -> Result<Vec<BuildRule>, PlanError> {
    let files: Vec<Prerequisite> = unit
        .files
        .iter()
        .map(|f| Prerequisite::File(request.root_dir.join(f)))
        .collect();

    let lister = env.registry.lister_for(unit)?;
    let list_action: Arc<dyn Action> =
        match lister.build_lister(&request.root_dir, unit, repo) {
            Ok(command) => Arc::new(ListDepsAction::new(command, env.runtime.clone())),
            Err(e) => {
                tracing::warn!("Cannot list dependencies of {}: {:#}", unit.id(), e);
                Arc::new(FailedAction::new(
                    format!("list-deps {}", unit.id()),
                    format!("failed to build dependency lister for {}: {:#}", unit.id(), e),
                ))
            }
        };

    let list_target = Target::for_unit(build_dir, unit, Phase::ListDeps);
    let resolve_target = Target::for_unit(build_dir, unit, Phase::ResolveDeps);

    let mut rules = vec![
        BuildRule {
            target: list_target.clone(),
            prerequisites: files.clone(),
            action: list_action,
        },
        BuildRule {
            target: resolve_target.clone(),
            prerequisites: vec![Prerequisite::Rule(list_target.path)],
            action: Arc::new(ResolveDepsAction::new(
                env.registry.clone(),
                repo.clone(),
                unit.clone(),
            )),
        },
    ];

    match env.registry.grapher_for(&unit.kind) {
        Ok(grapher) => {
            let mut prerequisites = vec![Prerequisite::Rule(resolve_target.path)];
            prerequisites.extend(files.iter().cloned());
            rules.push(BuildRule {
                target: Target::for_unit(build_dir, unit, Phase::Graph),
                prerequisites,
                action: Arc::new(GraphAction::new(grapher, repo.clone(), unit.clone())),
            });
        }
        Err(e) => tracing::warn!("Omitting graph phase for {}: {}", unit.id(), e),
    }

    if vcs == VcsKind::Git {
        rules.push(BuildRule {
            target: Target::for_unit(build_dir, unit, Phase::Blame),
            prerequisites: files,
            action: Arc::new(BlameAction::new(
                unit.clone(),
                request.commit_id.clone(),
                repo.skip_blame,
            )),
        });
    }

    Ok(rules)
}
