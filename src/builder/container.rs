//! Container commands - isolated toolchain invocations plus an output transform.
//!
//! A `ContainerCommand` only describes what to run. A `ContainerRuntime`
//! turns the description into a concrete process: `docker run` with the
//! repository mounted, or a plain host process when containers are disabled.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::util::config::{Config, RuntimeKind};
use crate::util::process::{find_executable, ProcessBuilder, ProcessError};

/// Pure function from raw command output to structured bytes.
pub type Transform = Arc<dyn Fn(&[u8]) -> anyhow::Result<Vec<u8>> + Send + Sync>;

/// Errors from running a container command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("container command has an empty argument vector")]
    EmptyArgs,

    #[error("failed to start `{command}`: {source:#}")]
    Spawn {
        command: String,
        source: anyhow::Error,
    },

    #[error(transparent)]
    Failed(#[from] ProcessError),

    #[error("could not parse output of `{command}`: {source:#}")]
    Transform {
        command: String,
        source: anyhow::Error,
    },
}

/// A single isolated-environment invocation.
#[derive(Clone)]
pub struct ContainerCommand {
    /// Image (toolchain identity) to run in
    pub image: String,

    /// Host directory mounted into the container
    pub host_dir: PathBuf,

    /// Working directory inside the container, where `host_dir` is mounted
    pub workdir: String,

    /// Argument vector
    pub args: Vec<String>,

    /// Extra environment
    pub env: Vec<(String, String)>,

    transform: Transform,
}

impl ContainerCommand {
    /// Create a command whose transform passes output through unchanged.
    pub fn new(
        image: impl Into<String>,
        host_dir: impl Into<PathBuf>,
        workdir: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        ContainerCommand {
            image: image.into(),
            host_dir: host_dir.into(),
            workdir: workdir.into(),
            args,
            env: Vec::new(),
            transform: Arc::new(|out: &[u8]| Ok(out.to_vec())),
        }
    }

    /// Set the output transform.
    pub fn with_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.transform = Arc::new(f);
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Apply the transform to raw output.
    pub fn transform(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        (self.transform)(raw)
    }

    /// Run the command on `runtime` and transform its stdout.
    pub fn run(&self, runtime: &dyn ContainerRuntime) -> Result<Vec<u8>, CommandError> {
        let process = runtime.invocation(self)?;
        let command = process.display_command();

        let stdout = process.exec_and_check().map_err(|e| match e.downcast::<ProcessError>() {
            Ok(failed) => CommandError::Failed(failed),
            Err(source) => CommandError::Spawn {
                command: command.clone(),
                source,
            },
        })?;

        self.transform(&stdout)
            .map_err(|source| CommandError::Transform { command, source })
    }
}

impl fmt::Debug for ContainerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerCommand")
            .field("image", &self.image)
            .field("host_dir", &self.host_dir)
            .field("workdir", &self.workdir)
            .field("args", &self.args)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// Turns container commands into processes.
pub trait ContainerRuntime: Send + Sync {
    /// Short runtime name for display.
    fn name(&self) -> &str;

    /// Build the host process that performs `cmd`.
    fn invocation(&self, cmd: &ContainerCommand) -> Result<ProcessBuilder, CommandError>;

    /// Whether the runtime can be used on this host.
    fn is_available(&self) -> bool;
}

/// Runs commands with `docker run`, mounting the host directory.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    program: PathBuf,
}

impl DockerRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        DockerRuntime {
            program: program.into(),
        }
    }
}

impl Default for DockerRuntime {
    fn default() -> Self {
        DockerRuntime::new("docker")
    }
}

impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &str {
        "docker"
    }

    fn invocation(&self, cmd: &ContainerCommand) -> Result<ProcessBuilder, CommandError> {
        if cmd.args.is_empty() {
            return Err(CommandError::EmptyArgs);
        }

        let mut process = ProcessBuilder::new(&self.program)
            .args(["run", "--rm"])
            .arg("-v")
            .arg(format!("{}:{}:ro", cmd.host_dir.display(), cmd.workdir))
            .arg("-w")
            .arg(&cmd.workdir);

        for (key, value) in &cmd.env {
            process = process.arg("-e").arg(format!("{}={}", key, value));
        }

        Ok(process.arg(&cmd.image).args(&cmd.args))
    }

    fn is_available(&self) -> bool {
        (self.program.is_absolute() && self.program.exists())
            || find_executable(&self.program.to_string_lossy()).is_some()
    }
}

/// Runs the argument vector directly on the host, in the host directory.
#[derive(Debug, Clone, Default)]
pub struct LocalRuntime;

impl ContainerRuntime for LocalRuntime {
    fn name(&self) -> &str {
        "local"
    }

    fn invocation(&self, cmd: &ContainerCommand) -> Result<ProcessBuilder, CommandError> {
        let (program, args) = cmd.args.split_first().ok_or(CommandError::EmptyArgs)?;

        let mut process = ProcessBuilder::new(Path::new(program))
            .args(args)
            .cwd(&cmd.host_dir);
        for (key, value) in &cmd.env {
            process = process.env(key, value);
        }
        Ok(process)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Create the runtime selected by configuration.
pub fn runtime_from_config(config: &Config) -> Arc<dyn ContainerRuntime> {
    match config.runtime() {
        RuntimeKind::Docker => Arc::new(DockerRuntime::new(config.container_program())),
        RuntimeKind::Local => Arc::new(LocalRuntime),
    }
}
