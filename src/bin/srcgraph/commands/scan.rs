//! `srcgraph scan` command

use anyhow::Result;

use crate::cli::RepoArgs;
use srcgraph::ops::scan;

pub fn execute(args: RepoArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args, verbose)?;
    let repo = scan(&checkout, &env, ctx.config())?;
    super::print_json(&repo)
}
