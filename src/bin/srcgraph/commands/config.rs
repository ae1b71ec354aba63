//! `srcgraph config` command

use anyhow::Result;

use crate::cli::ConfigArgs;
use srcgraph::ops::repository_config;

pub fn execute(args: ConfigArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args.repo, verbose)?;
    let repo = repository_config(&checkout, &env, ctx.config(), args.finalize)?;
    super::print_json(&repo)
}
