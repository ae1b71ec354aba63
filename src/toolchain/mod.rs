//! Toolchain plugins.
//!
//! A toolchain contributes a unit scanner, a lister for its unit kind and a
//! resolver for its dependency kind. Graphers are external analyzers wired
//! up from configuration.

pub mod golang;
pub mod grapher;

pub use golang::GoToolchain;
pub use grapher::CommandGrapher;
