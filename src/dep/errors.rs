//! Dependency listing and resolution errors.

use thiserror::Error;

use crate::builder::container::CommandError;
use crate::core::registry::RegistryError;

/// Failure to enumerate a unit's raw dependencies.
#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build dependency lister for `{unit}`: {source:#}")]
    Build {
        unit: String,
        source: anyhow::Error,
    },

    #[error("dependency listing failed for `{unit}`: {source}")]
    Command {
        unit: String,
        source: CommandError,
    },

    #[error("malformed dependency list for `{unit}`: {source}")]
    Decode {
        unit: String,
        source: serde_json::Error,
    },
}

/// Failure to resolve one raw dependency.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("malformed dependency identity {identity} (expected {expected})")]
    MalformedIdentity {
        identity: String,
        expected: &'static str,
    },

    #[error("unable to fetch information about `{identity}`: {source:#}")]
    Lookup {
        identity: String,
        source: anyhow::Error,
    },

    #[error("cannot compute path of `{identity}` relative to project root `{root}`")]
    OutsideProjectRoot { identity: String, root: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_message() {
        let err = ResolveError::Lookup {
            identity: "github.com/foo/bar".to_string(),
            source: anyhow::anyhow!("HTTP 404"),
        };
        assert_eq!(
            err.to_string(),
            "unable to fetch information about `github.com/foo/bar`: HTTP 404"
        );
    }
}
