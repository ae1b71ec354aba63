//! Implementation of `srcgraph make`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::events::{json_lines_sink, EventSink};
use crate::builder::executor::{execute, render, ExecuteOptions, ExecuteReport};
use crate::builder::plan::{plan, BuildPlan, PlanRequest};
use crate::core::environment::Environment;
use crate::ops::checkout::CheckoutSpec;
use crate::util::config::Config;

/// How build progress is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFormat {
    /// Log lines and a progress bar
    #[default]
    Human,
    /// One JSON build event per line on stdout
    Json,
}

impl std::str::FromStr for MessageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(MessageFormat::Human),
            "json" => Ok(MessageFormat::Json),
            other => anyhow::bail!("unknown message format `{}` (expected human or json)", other),
        }
    }
}

/// Options for the make command.
#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    /// Print the rules instead of running them
    pub dry_run: bool,

    /// Continue with independent rules after a failure
    pub keep_going: bool,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Log the planned rules before running them
    pub show_rules: bool,

    pub message_format: MessageFormat,
}

/// What `make` did.
#[derive(Debug)]
pub enum MakeOutcome {
    /// Makefile-style listing of the planned rules
    Rendered(String),
    Executed(ExecuteReport),
}

/// Plan the build of a checkout.
pub fn plan_checkout(
    checkout: &CheckoutSpec,
    env: &Environment,
    config: &Config,
    work_dir: PathBuf,
) -> Result<BuildPlan> {
    let request = PlanRequest {
        root_dir: checkout.root.clone(),
        clone_url: checkout.clone_url.clone(),
        commit_id: checkout.commit_id.clone(),
        vcs: checkout.vcs.clone(),
        work_dir,
    };
    plan(&request, env, config)
        .with_context(|| format!("failed to plan build of {}", checkout.root.display()))
}

/// Plan the build and either render or execute it.
pub fn make(
    checkout: &CheckoutSpec,
    env: &Environment,
    config: &Config,
    work_dir: PathBuf,
    opts: &MakeOptions,
) -> Result<MakeOutcome> {
    let plan = plan_checkout(checkout, env, config, work_dir)?;

    if opts.dry_run {
        return Ok(MakeOutcome::Rendered(render(&plan)));
    }
    if opts.show_rules {
        tracing::info!("# Makefile\n{}", render(&plan));
    }

    if !env.runtime.is_available() {
        tracing::warn!(
            "Container runtime `{}` not found; list-deps rules will fail",
            env.runtime.name()
        );
    }

    let events: Option<EventSink> = match opts.message_format {
        MessageFormat::Json => Some(json_lines_sink()),
        MessageFormat::Human => None,
    };

    let exec_opts = ExecuteOptions {
        jobs: opts.jobs.or(config.build.jobs),
        keep_going: opts.keep_going || config.build.keep_going,
        progress: opts.message_format == MessageFormat::Human,
        events,
    };

    let report = execute(&plan, &exec_opts)
        .with_context(|| format!("build of {} failed", checkout.root.display()))?;
    Ok(MakeOutcome::Executed(report))
}
