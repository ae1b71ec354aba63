//! srcgraph CLI - incremental source analysis builds

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("srcgraph=debug")
    } else {
        EnvFilter::new("srcgraph=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let verbose = cli.verbose;
    match cli.command {
        Commands::Make(args) => commands::make::execute(args, verbose),
        Commands::Scan(args) => commands::scan::execute(args, verbose),
        Commands::Config(args) => commands::config::execute(args, verbose),
        Commands::ListDeps(args) => commands::deps::list(args, verbose),
        Commands::ResolveDeps(args) => commands::deps::resolve(args, verbose),
        Commands::Graph(args) => commands::deps::graph(args, verbose),
        Commands::Upload(args) => commands::upload::upload(args, verbose),
        Commands::Push(args) => commands::upload::push(args, verbose),
        Commands::Data(args) => commands::upload::data(args, verbose),
        Commands::Info => commands::info::execute(),
    }
}
