//! `srcgraph info` command

use anyhow::Result;

use srcgraph::ops::{format_report, info};
use srcgraph::util::GlobalContext;
use srcgraph::Environment;

pub fn execute() -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    let cwd = ctx.cwd().to_path_buf();
    ctx.load_repository_config(&cwd);

    let env = Environment::from_config(ctx.config())?;
    print!("{}", format_report(&info(&ctx, &env)));
    Ok(())
}
