//! Dependency discovery and resolution engine.
//!
//! - [`lister`] runs a unit's lister command and decodes raw dependencies
//! - [`resolver`] dispatches raw dependencies to the registered resolvers
//! - [`cache`] is the per-toolchain resolution cache

pub mod cache;
pub mod errors;
pub mod lister;
pub mod resolver;

pub use cache::ResolutionCache;
pub use errors::{ListError, ResolveError};
pub use lister::{dedup_raw_dependencies, line_transform};
pub use resolver::{resolve, resolve_all};
