//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// srcgraph - incremental source analysis builds
#[derive(Parser)]
#[command(name = "srcgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan and run the analysis build of a repository
    Make(MakeArgs),

    /// Scan a repository into source units
    Scan(RepoArgs),

    /// Validate and print a repository's configuration
    Config(ConfigArgs),

    /// List the raw dependencies of source units
    ListDeps(UnitArgs),

    /// List and resolve the dependencies of source units
    ResolveDeps(UnitArgs),

    /// Extract symbols and references of source units
    Graph(UnitArgs),

    /// Upload built targets to the API
    Upload(RepoArgs),

    /// Mark a commit's build as complete on the API
    Push(RepoArgs),

    /// List the build data stored on the API for a repository
    Data(DataArgs),

    /// Show toolchain and configuration information
    Info,
}

/// Which checkout to work on. Unset values are detected from git or hg.
#[derive(Args, Clone, Default)]
pub struct RepoArgs {
    /// Repository root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Clone URL of the repository
    #[arg(long = "cloneurl")]
    pub clone_url: Option<String>,

    /// Commit ID to build
    #[arg(long)]
    pub commit: Option<String>,

    /// Version control system (git, hg)
    #[arg(long)]
    pub vcs: Option<String>,

    /// Directory holding build targets
    #[arg(long, env = "SRCGRAPH_WORK_DIR")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct MakeArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Print the rules without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep going when a rule fails
    #[arg(short, long)]
    pub keep_going: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Progress output (human, json)
    #[arg(long, default_value = "human")]
    pub message_format: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Add scanned source units before printing (false: `Srcgraph.toml` only)
    #[arg(long = "final", default_value_t = true, action = ArgAction::Set)]
    pub finalize: bool,
}

#[derive(Args)]
pub struct DataArgs {
    /// Repository URI (default: detected from the current checkout)
    #[arg(long)]
    pub repo: Option<String>,

    /// Commit ID (default: the checkout's commit when the repository is detected)
    #[arg(long)]
    pub commit: Option<String>,
}

#[derive(Args)]
pub struct UnitArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Source unit names (default: all units)
    pub units: Vec<String>,
}
