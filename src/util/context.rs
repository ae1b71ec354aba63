//! Global context for srcgraph operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{global_config_dir, load_config, project_config_path, Config};

/// Project directories for srcgraph
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "sourcegraph", "srcgraph"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global srcgraph data
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults and the global config file.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.cache_dir().to_path_buf()
        } else {
            global_config_dir().unwrap_or_else(|| PathBuf::from(".srcgraph"))
        };

        let mut ctx = GlobalContext {
            cwd,
            home,
            verbose: false,
            config: Config::default(),
        };
        ctx.config = load_config(&ctx.config_path(), Path::new(""));
        Ok(ctx)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Reload configuration, layering the repository's project config on top.
    pub fn load_repository_config(&mut self, repo_root: &Path) {
        self.config = load_config(&self.config_path(), &project_config_path(repo_root));
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        global_config_dir()
            .unwrap_or_else(|| self.home.clone())
            .join("config.toml")
    }

    /// Directory holding rule targets.
    pub fn work_dir(&self) -> PathBuf {
        self.config
            .build
            .work_dir
            .clone()
            .unwrap_or_else(|| self.home.join("build"))
    }

    /// Override the work directory.
    pub fn set_work_dir(&mut self, dir: PathBuf) {
        self.config.build.work_dir = Some(dir);
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.work_dir().ends_with("build") || ctx.config().build.work_dir.is_some());
    }

    #[test]
    fn test_work_dir_override() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = GlobalContext::new().unwrap();
        ctx.set_work_dir(tmp.path().join("work"));
        assert_eq!(ctx.work_dir(), tmp.path().join("work"));
    }

    #[test]
    fn test_verbose() {
        let mut ctx = GlobalContext::new().unwrap();
        assert!(!ctx.is_verbose());
        ctx.set_verbose(true);
        assert!(ctx.is_verbose());
    }

    #[test]
    fn test_repository_config_layered() {
        let tmp = TempDir::new().unwrap();
        let project = project_config_path(tmp.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[go]\nimage = \"golang:custom\"\n").unwrap();

        let mut ctx = GlobalContext::new().unwrap();
        ctx.load_repository_config(tmp.path());
        assert_eq!(ctx.config().go.image(), "golang:custom");
    }
}
