//! High-level operations.
//!
//! This module contains the implementation of srcgraph commands.

pub mod checkout;
pub mod deps;
pub mod info;
pub mod make;
pub mod upload;

pub use checkout::{resolve_checkout, CheckoutOptions, CheckoutSpec};
pub use deps::{graph, list_deps, repository_config, resolve_deps, scan, select_units};
pub use info::{format_report, info, InfoReport};
pub use make::{make, plan_checkout, MakeOptions, MakeOutcome, MessageFormat};
pub use upload::{list_data, push, upload, ApiClient, UploadReport};
