//! Command implementations

pub mod config;
pub mod deps;
pub mod info;
pub mod make;
pub mod scan;
pub mod upload;

use anyhow::Result;

use crate::cli::RepoArgs;
use srcgraph::ops::{resolve_checkout, CheckoutOptions, CheckoutSpec};
use srcgraph::util::GlobalContext;
use srcgraph::Environment;

/// Detect the checkout and load its configuration.
pub fn checkout_context(args: &RepoArgs, verbose: bool) -> Result<(GlobalContext, CheckoutSpec)> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(verbose);

    let opts = CheckoutOptions {
        root: args.root.clone(),
        clone_url: args.clone_url.clone(),
        commit_id: args.commit.clone(),
        vcs: args.vcs.clone(),
    };
    let checkout = resolve_checkout(&opts, ctx.cwd())?;

    ctx.load_repository_config(&checkout.root);
    if let Some(dir) = &args.work_dir {
        let dir = ctx.cwd().join(dir);
        ctx.set_work_dir(dir);
    }
    Ok((ctx, checkout))
}

/// Checkout, context and toolchain environment for a command.
pub fn setup(args: &RepoArgs, verbose: bool) -> Result<(GlobalContext, CheckoutSpec, Environment)> {
    let (ctx, checkout) = checkout_context(args, verbose)?;
    let env = Environment::from_config(ctx.config())?;
    Ok((ctx, checkout, env))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
