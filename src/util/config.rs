//! Configuration file support for srcgraph.
//!
//! srcgraph reads two configuration file locations:
//! - Global: `~/.srcgraph/config.toml` - User-wide defaults
//! - Project: `<repo>/.srcgraph/config.toml` - Repository-specific overrides
//!
//! Project config takes precedence over global config. Every field is
//! optional; accessors supply the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default Go toolchain version label.
pub const DEFAULT_GO_VERSION: &str = "go1.22.0";

/// Default container image used for Go listing commands.
pub const DEFAULT_GO_IMAGE: &str = "golang:1.22";

/// Clone URL of the Go distribution repository.
pub const DEFAULT_GO_CLONE_URL: &str = "https://go.googlesource.com/go";

/// Legacy import path prefix that maps onto the Go distribution.
pub const DEFAULT_GO_BASE_IMPORT_PATH: &str = "code.google.com/p/go";

/// Default API endpoint for uploads and pushes.
pub const DEFAULT_API_URL: &str = "https://sourcegraph.com/api/";

/// Default endpoint for import path metadata lookups.
pub const DEFAULT_METADATA_URL: &str = "https://sourcegraph.com/api/go/import-paths/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// srcgraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Container runtime settings
    pub container: ContainerConfig,

    /// Go toolchain settings
    pub go: GoConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel rule workers (None = auto-detect)
    pub jobs: Option<usize>,

    /// Directory holding rule targets
    pub work_dir: Option<PathBuf>,

    /// Continue with independent rules after a failure
    pub keep_going: bool,

    /// Return empty blame output instead of running blame
    pub skip_blame: bool,
}

/// Which runtime executes container commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// `docker run` with the repository mounted
    #[default]
    Docker,
    /// Run the argument vector directly on the host
    Local,
}

/// Container runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Runtime kind (docker, local)
    pub runtime: Option<RuntimeKind>,

    /// Path or name of the container CLI
    pub program: Option<String>,
}

/// Go toolchain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoConfig {
    /// Version label stamped onto standard library targets
    pub version: Option<String>,

    /// VCS revision of the distribution (defaults to the version label)
    pub revision: Option<String>,

    /// Image used for `go list`
    pub image: Option<String>,

    /// Clone URL of the Go distribution
    pub clone_url: Option<String>,

    /// Legacy prefix trimmed from import paths before resolution
    pub base_import_path: Option<String>,

    /// External grapher command; the unit directory is appended
    pub grapher: Option<Vec<String>>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Base URL of the upload/push API
    pub api_url: Option<String>,

    /// Base URL of the import path metadata service
    pub metadata_url: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.work_dir.is_some() {
            self.build.work_dir = other.build.work_dir;
        }
        if other.build.keep_going {
            self.build.keep_going = true;
        }
        if other.build.skip_blame {
            self.build.skip_blame = true;
        }

        if other.container.runtime.is_some() {
            self.container.runtime = other.container.runtime;
        }
        if other.container.program.is_some() {
            self.container.program = other.container.program;
        }

        merge_opt(&mut self.go.version, other.go.version);
        merge_opt(&mut self.go.revision, other.go.revision);
        merge_opt(&mut self.go.image, other.go.image);
        merge_opt(&mut self.go.clone_url, other.go.clone_url);
        merge_opt(&mut self.go.base_import_path, other.go.base_import_path);
        if other.go.grapher.is_some() {
            self.go.grapher = other.go.grapher;
        }

        merge_opt(&mut self.net.api_url, other.net.api_url);
        merge_opt(&mut self.net.metadata_url, other.net.metadata_url);
        if other.net.timeout_secs.is_some() {
            self.net.timeout_secs = other.net.timeout_secs;
        }
    }

    /// Whether blame should be skipped, honoring `SRCGRAPH_SKIP_BLAME`.
    pub fn skip_blame(&self) -> bool {
        self.build.skip_blame || env_flag("SRCGRAPH_SKIP_BLAME")
    }

    /// Container runtime kind.
    pub fn runtime(&self) -> RuntimeKind {
        self.container.runtime.unwrap_or_default()
    }

    /// Container CLI program.
    pub fn container_program(&self) -> &str {
        self.container.program.as_deref().unwrap_or("docker")
    }

    /// HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.net.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Upload/push API base URL.
    pub fn api_url(&self) -> &str {
        self.net.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Metadata service base URL.
    pub fn metadata_url(&self) -> &str {
        self.net.metadata_url.as_deref().unwrap_or(DEFAULT_METADATA_URL)
    }
}

impl GoConfig {
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_GO_VERSION)
    }

    pub fn revision(&self) -> &str {
        self.revision.as_deref().unwrap_or_else(|| self.version())
    }

    pub fn image(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_GO_IMAGE)
    }

    pub fn clone_url(&self) -> &str {
        self.clone_url.as_deref().unwrap_or(DEFAULT_GO_CLONE_URL)
    }

    pub fn base_import_path(&self) -> &str {
        self.base_import_path
            .as_deref()
            .unwrap_or(DEFAULT_GO_BASE_IMPORT_PATH)
    }
}

fn merge_opt(slot: &mut Option<String>, other: Option<String>) {
    if other.is_some() {
        *slot = other;
    }
}

/// Parse a boolean-ish environment variable ("1", "true", "yes").
fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (<repo>/.srcgraph/config.toml)
/// 2. Global config (~/.srcgraph/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global srcgraph config directory (~/.srcgraph).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".srcgraph"))
}

/// Get the project config path (<repo>/.srcgraph/config.toml).
pub fn project_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".srcgraph").join("config.toml")
}
