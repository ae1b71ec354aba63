//! `srcgraph upload`, `srcgraph push` and `srcgraph data` commands

use anyhow::Result;

use crate::cli::{DataArgs, RepoArgs};
use srcgraph::ops::{list_data, plan_checkout, push as push_build, upload as upload_targets, ApiClient};
use srcgraph::util::GlobalContext;

pub fn upload(args: RepoArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args, verbose)?;
    let config = ctx.config();
    let plan = plan_checkout(&checkout, &env, config, ctx.work_dir())?;

    let client = ApiClient::new(config.api_url(), config.timeout())?;
    let report = upload_targets(&client, &checkout, &plan)?;

    eprintln!(
        "    Uploaded {} target(s), {} not built",
        report.uploaded.len(),
        report.missing.len()
    );
    Ok(())
}

pub fn push(args: RepoArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout) = super::checkout_context(&args, verbose)?;
    let config = ctx.config();
    let client = ApiClient::new(config.api_url(), config.timeout())?;
    push_build(&client, &checkout)
}

pub fn data(args: DataArgs, verbose: bool) -> Result<()> {
    let (ctx, uri, commit) = match args.repo {
        Some(uri) => {
            let mut ctx = GlobalContext::new()?;
            ctx.set_verbose(verbose);
            (ctx, uri, args.commit)
        }
        None => {
            let (ctx, checkout) = super::checkout_context(&RepoArgs::default(), verbose)?;
            let commit = args.commit.or(Some(checkout.commit_id.clone()));
            (ctx, checkout.uri(), commit)
        }
    };

    let config = ctx.config();
    let client = ApiClient::new(config.api_url(), config.timeout())?;
    let data = list_data(&client, &uri, commit.as_deref())?;
    super::print_json(&data)
}
