//! Go toolchain: package scanning, `go list` dependency listing and
//! import path resolution.

mod lister;
mod resolver;
mod scanner;
pub mod stdlib;

use std::sync::Arc;

use crate::core::dependency::DependencyKind;
use crate::core::registry::RegistryBuilder;
use crate::core::unit::UnitKind;
use crate::dep::cache::ResolutionCache;
use crate::sources::metadata::MetadataSource;
use crate::util::config::GoConfig;

pub use scanner::GoScanner;

/// Unit kind of a Go package.
pub const GO_PACKAGE: &str = "GoPackage";

/// Dependency kind of a Go import path.
pub const GO_IMPORT_PATH: &str = "go-import-path";

/// One configured Go toolchain.
///
/// Owns the resolution cache, so every resolution made through the same
/// instance shares it.
pub struct GoToolchain {
    /// Version label stamped onto standard library targets
    version: String,

    /// Revision of the distribution repository
    revision: String,

    /// Image running `go list`
    image: String,

    /// Clone URL of the distribution repository
    clone_url: String,

    /// Prefix stripped from import paths before resolution
    base_import_path: String,

    metadata: Arc<dyn MetadataSource>,

    cache: ResolutionCache,
}

impl GoToolchain {
    pub fn new(config: &GoConfig, metadata: Arc<dyn MetadataSource>) -> Self {
        GoToolchain {
            version: config.version().to_string(),
            revision: config.revision().to_string(),
            image: config.image().to_string(),
            clone_url: config.clone_url().to_string(),
            base_import_path: config.base_import_path().to_string(),
            metadata,
            cache: ResolutionCache::new(),
        }
    }

    /// Register the Go lister, resolver and scanner.
    pub fn register(self: Arc<Self>, builder: RegistryBuilder) -> RegistryBuilder {
        builder
            .register_lister(UnitKind::new(GO_PACKAGE), self.clone())
            .register_resolver(DependencyKind::new(GO_IMPORT_PATH), self)
            .register_scanner(Arc::new(GoScanner))
    }
}
