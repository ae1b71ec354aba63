//! Implementation of `srcgraph info`.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::core::environment::Environment;
use crate::util::config::Config;
use crate::util::GlobalContext;

/// Toolchain and configuration summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReport {
    pub version: String,
    pub config_path: PathBuf,
    pub work_dir: PathBuf,
    pub runtime: String,
    pub runtime_available: bool,
    pub go_version: String,
    pub go_image: String,
    pub listers: Vec<String>,
    pub resolvers: Vec<String>,
    pub graphers: Vec<String>,
}

/// Collect the report for a context and environment.
pub fn info(ctx: &GlobalContext, env: &Environment) -> InfoReport {
    let config: &Config = ctx.config();
    let listers = env.registry.lister_kinds().iter().map(|k| k.to_string()).collect();
    let resolvers = env.registry.resolver_kinds().iter().map(|k| k.to_string()).collect();
    let graphers = env.registry.grapher_kinds().iter().map(|k| k.to_string()).collect();

    InfoReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_path: ctx.config_path(),
        work_dir: ctx.work_dir(),
        runtime: env.runtime.name().to_string(),
        runtime_available: env.runtime.is_available(),
        go_version: config.go.version().to_string(),
        go_image: config.go.image().to_string(),
        listers,
        resolvers,
        graphers,
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Human-readable rendering of the report.
pub fn format_report(report: &InfoReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "srcgraph {}", report.version);
    let _ = writeln!(out, "config:    {}", report.config_path.display());
    let _ = writeln!(out, "work dir:  {}", report.work_dir.display());
    let _ = writeln!(
        out,
        "runtime:   {}{}",
        report.runtime,
        if report.runtime_available { "" } else { " (not found)" }
    );
    let _ = writeln!(out, "go:        {} ({})", report.go_version, report.go_image);
    let _ = writeln!(out, "listers:   {}", list(&report.listers));
    let _ = writeln!(out, "resolvers: {}", list(&report.resolvers));
    let _ = writeln!(out, "graphers:  {}", list(&report.graphers));
    out
}
