//! Toolchain environment - everything a build needs besides the repository.
//!
//! Built once at startup from configuration and passed explicitly to
//! planning and execution.

use std::sync::Arc;

use anyhow::Result;

use crate::builder::container::{runtime_from_config, ContainerRuntime};
use crate::core::registry::Registry;
use crate::core::unit::UnitKind;
use crate::scan::{DirScanner, Scanner};
use crate::sources::metadata::{HttpMetadataSource, MetadataSource};
use crate::toolchain::golang::{GoToolchain, GO_PACKAGE};
use crate::toolchain::grapher::CommandGrapher;
use crate::util::config::Config;

#[derive(Clone)]
pub struct Environment {
    pub registry: Arc<Registry>,
    pub runtime: Arc<dyn ContainerRuntime>,
    pub scanner: Arc<dyn Scanner>,
}

impl Environment {
    /// Assemble an environment from explicit parts.
    pub fn new(
        registry: Registry,
        runtime: Arc<dyn ContainerRuntime>,
        scanner: Arc<dyn Scanner>,
    ) -> Self {
        Environment {
            registry: Arc::new(registry),
            runtime,
            scanner,
        }
    }

    /// Environment with the built-in toolchains, querying the configured
    /// metadata service.
    pub fn from_config(config: &Config) -> Result<Self> {
        let metadata = HttpMetadataSource::new(config.metadata_url(), config.timeout())?;
        Ok(Self::with_metadata(config, Arc::new(metadata)))
    }

    /// Environment with the built-in toolchains and a given metadata source.
    pub fn with_metadata(config: &Config, metadata: Arc<dyn MetadataSource>) -> Self {
        let runtime = runtime_from_config(config);
        let go = Arc::new(GoToolchain::new(&config.go, metadata));

        let mut builder = go.register(Registry::builder());
        if let Some(command) = config.go.grapher.clone().filter(|c| !c.is_empty()) {
            builder = builder.register_grapher(
                UnitKind::new(GO_PACKAGE),
                Arc::new(CommandGrapher::new(
                    config.go.image(),
                    command,
                    runtime.clone(),
                )),
            );
        }
        let registry = builder.build();

        tracing::debug!(
            "Toolchain environment: runtime={}, listers={:?}, resolvers={:?}, graphers={:?}",
            runtime.name(),
            registry.lister_kinds(),
            registry.resolver_kinds(),
            registry.grapher_kinds()
        );

        let scanner = Arc::new(DirScanner::new(registry.scanners().to_vec()));
        Environment::new(registry, runtime, scanner)
    }
}
