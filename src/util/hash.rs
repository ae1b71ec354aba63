//! Hashing utilities for action fingerprints.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a string.
pub fn sha256_str(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_str() {
        assert_eq!(
            sha256_str("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_describe_changes_hash() {
        assert_ne!(
            sha256_str("docker run golang:1.22 go list ./util"),
            sha256_str("docker run golang:1.23 go list ./util")
        );
    }
}
