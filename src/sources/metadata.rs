//! Remote package metadata lookup.
//!
//! Maps a dependency identity to the project that hosts it. Used by
//! resolvers for identities that are neither internal nor part of a
//! toolchain distribution.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Where an identity lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Identity prefix at which the project's repository root is mounted
    #[serde(rename = "projectRoot")]
    pub project_root: String,

    /// Clone URL of the project's repository
    #[serde(rename = "projectURL")]
    pub project_url: String,

    /// Canonical form of the looked-up identity
    #[serde(rename = "importPath")]
    pub import_path: String,
}

/// Source of project metadata.
pub trait MetadataSource: Send + Sync {
    fn lookup(&self, identity: &str) -> Result<ProjectInfo>;
}

/// Looks identities up with `GET <base_url>/<identity>`.
pub struct HttpMetadataSource {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl HttpMetadataSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).with_context(|| format!("invalid metadata URL: {}", base_url))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("srcgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(HttpMetadataSource { base_url, client })
    }

    /// URL queried for `identity`.
    pub fn url_for(&self, identity: &str) -> Result<Url> {
        self.base_url
            .join(identity.trim_start_matches('/'))
            .with_context(|| format!("cannot build metadata URL for {}", identity))
    }
}

impl MetadataSource for HttpMetadataSource {
    fn lookup(&self, identity: &str) -> Result<ProjectInfo> {
        let url = self.url_for(identity)?;
        tracing::debug!("Looking up {} at {}", identity, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("metadata lookup for {} failed: HTTP {} {}", identity, status, body.trim());
        }

        response
            .json::<ProjectInfo>()
            .with_context(|| format!("invalid metadata response for {}", identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_info_json() {
        let info: ProjectInfo = serde_json::from_str(
            r#"{"projectRoot":"github.com/foo/bar","projectURL":"https://github.com/foo/bar/","importPath":"github.com/foo/bar/baz"}"#,
        )
        .unwrap();
        assert_eq!(info.project_root, "github.com/foo/bar");
        assert_eq!(info.project_url, "https://github.com/foo/bar/");
        assert_eq!(info.import_path, "github.com/foo/bar/baz");
    }

    #[test]
    fn test_url_for() {
        let source =
            HttpMetadataSource::new("https://meta.example/api/import", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            source.url_for("github.com/foo/bar").unwrap().as_str(),
            "https://meta.example/api/import/github.com/foo/bar"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpMetadataSource::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_unreachable_host_is_error() {
        let source = HttpMetadataSource::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        assert!(source.lookup("github.com/foo/bar").is_err());
    }
}
