//! `srcgraph make` command

use anyhow::Result;

use crate::cli::MakeArgs;
use srcgraph::ops::{make, MakeOptions, MakeOutcome, MessageFormat};

pub fn execute(args: MakeArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args.repo, verbose)?;

    let opts = MakeOptions {
        dry_run: args.dry_run,
        keep_going: args.keep_going,
        jobs: args.jobs,
        show_rules: ctx.is_verbose(),
        message_format: args.message_format.parse::<MessageFormat>()?,
    };

    match make(&checkout, &env, ctx.config(), ctx.work_dir(), &opts)? {
        MakeOutcome::Rendered(text) => print!("{}", text),
        MakeOutcome::Executed(report) => {
            if opts.message_format == MessageFormat::Human {
                eprintln!(
                    "    Finished {} rule(s), {} fresh, in {:.2}s",
                    report.ran.len(),
                    report.fresh.len(),
                    report.duration.as_secs_f64()
                );
            }
        }
    }

    Ok(())
}
