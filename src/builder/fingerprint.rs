//! Action fingerprints for incremental execution.
//!
//! A rule's fingerprint is the SHA-256 of its action description. A changed
//! description (new image, new arguments) makes the rule stale even when its
//! target is newer than every prerequisite.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::write_atomic;
use crate::util::hash::sha256_str;

/// File name of the fingerprint cache inside the work directory.
pub const FINGERPRINT_FILE: &str = ".fingerprints.json";

/// Fingerprint of an action description.
pub fn action_fingerprint(description: &str) -> String {
    sha256_str(description)
}

/// Recorded fingerprints by target path.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintCache {
    pub rules: BTreeMap<PathBuf, String>,
}

impl FingerprintCache {
    /// Load the fingerprint cache from a file.
    ///
    /// A missing or unreadable cache is treated as empty.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return FingerprintCache::default();
        }

        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str(&content)?))
        {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Ignoring fingerprint cache {}: {:#}", path.display(), e);
                FingerprintCache::default()
            }
        }
    }

    /// Save the fingerprint cache to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &content)
            .with_context(|| format!("failed to save fingerprints to {}", path.display()))
    }

    /// Whether a recorded fingerprint disagrees with `current`.
    ///
    /// Targets without a recorded fingerprint are not considered stale.
    pub fn is_stale(&self, target: &Path, current: &str) -> bool {
        self.rules
            .get(target)
            .is_some_and(|recorded| recorded != current)
    }

    pub fn update(&mut self, target: PathBuf, fingerprint: String) {
        self.rules.insert(target, fingerprint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stale_detection() {
        let mut cache = FingerprintCache::default();
        let target = PathBuf::from("/w/a.json");

        assert!(!cache.is_stale(&target, "x"));

        cache.update(target.clone(), action_fingerprint("go list ./a"));
        assert!(!cache.is_stale(&target, &action_fingerprint("go list ./a")));
        assert!(cache.is_stale(&target, &action_fingerprint("go list ./b")));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(FINGERPRINT_FILE);

        let mut cache = FingerprintCache::default();
        cache.update(PathBuf::from("/w/a.json"), "abc".to_string());
        cache.save(&path).unwrap();

        assert_eq!(FingerprintCache::load(&path), cache);
    }

    #[test]
    fn test_corrupt_cache_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(FINGERPRINT_FILE);
        std::fs::write(&path, "{not json").unwrap();

        assert!(FingerprintCache::load(&path).rules.is_empty());
    }
}
