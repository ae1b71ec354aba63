//! External metadata sources consulted during resolution.

pub mod metadata;

pub use metadata::{HttpMetadataSource, MetadataSource, ProjectInfo};
