//! Version control helpers: checkout detection and blame.

pub mod blame;
pub mod detect;

pub use blame::{blame_files, BlameOutput};
pub use detect::{detect, Checkout};
