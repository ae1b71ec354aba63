//! Implementation of `srcgraph upload`, `srcgraph push` and `srcgraph data`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::builder::plan::BuildPlan;
use crate::ops::checkout::CheckoutSpec;

/// Client for the build data API.
pub struct ApiClient {
    base_url: Url,
    client: reqwest::blocking::Client,
}

/// What `upload` sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    /// Targets not yet built
    pub missing: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).with_context(|| format!("invalid API URL: {}", base_url))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("srcgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(ApiClient { base_url, client })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {}", path))
    }

    fn commit_url(&self, uri: &str, commit_id: &str, rest: &str) -> Result<Url> {
        self.url(&format!("repositories/{}/commits/{}/{}", uri, commit_id, rest))
    }

    /// URL receiving one build data file.
    pub fn build_data_url(&self, uri: &str, commit_id: &str, rel_name: &str) -> Result<Url> {
        self.commit_url(uri, commit_id, &format!("build-data/{}", rel_name))
    }

    /// URL listing the build data stored for a repository, or for one
    /// of its commits.
    pub fn build_data_list_url(&self, uri: &str, commit_id: Option<&str>) -> Result<Url> {
        match commit_id {
            Some(commit_id) => self.commit_url(uri, commit_id, "build-data"),
            None => self.url(&format!("repositories/{}/build-data", uri)),
        }
    }

    /// URL that marks a commit's build as complete.
    pub fn build_url(&self, uri: &str, commit_id: &str) -> Result<Url> {
        self.commit_url(uri, commit_id, "build")
    }

    fn get_json(&self, url: Url) -> Result<serde_json::Value> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("GET {} returned {}: {}", url, status, body.trim());
        }
        response
            .json()
            .with_context(|| format!("malformed response from {}", url))
    }

    fn put(&self, url: Url, body: Vec<u8>) -> Result<()> {
        tracing::debug!("PUT {}", url);
        let response = self
            .client
            .put(url.clone())
            .body(body)
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("PUT {} returned {}: {}", url, status, body.trim());
        }
        Ok(())
    }
}

/// Upload every built target of `plan`.
pub fn upload(client: &ApiClient, checkout: &CheckoutSpec, plan: &BuildPlan) -> Result<UploadReport> {
    let uri = checkout.uri();
    if uri.is_empty() {
        bail!("cannot upload without a clone URL (pass --cloneurl)");
    }

    let mut report = UploadReport::default();
    for rule in &plan.rules {
        let target = &rule.target;
        if !target.path.is_file() {
            tracing::warn!("Skipping {} (not built)", target.rel_name);
            report.missing.push(target.rel_name.clone());
            continue;
        }

        let data = std::fs::read(&target.path)
            .with_context(|| format!("failed to read {}", target.path.display()))?;
        let url = client.build_data_url(&uri, &checkout.commit_id, &target.rel_name)?;
        client
            .put(url, data)
            .with_context(|| format!("failed to upload {}", target.rel_name))?;

        tracing::info!("Uploaded {}", target.rel_name);
        report.uploaded.push(target.rel_name.clone());
    }
    Ok(report)
}

/// Tell the API that the commit's build data is complete.
pub fn push(client: &ApiClient, checkout: &CheckoutSpec) -> Result<()> {
    let uri = checkout.uri();
    if uri.is_empty() {
        bail!("cannot push without a clone URL (pass --cloneurl)");
    }
    let url = client.build_url(&uri, &checkout.commit_id)?;
    client
        .put(url, Vec::new())
        .with_context(|| format!("failed to push build of {} at {}", uri, checkout.commit_id))?;
    tracing::info!("Pushed build of {} at {}", uri, checkout.commit_id);
    Ok(())
}

/// Build data the API holds for a repository, optionally for one commit.
pub fn list_data(client: &ApiClient, uri: &str, commit_id: Option<&str>) -> Result<serde_json::Value> {
    if uri.is_empty() {
        bail!("cannot list build data without a repository URI (pass --repo)");
    }
    let commit_id = commit_id.filter(|c| !c.is_empty());
    let url = client.build_data_list_url(uri, commit_id)?;
    client
        .get_json(url)
        .with_context(|| format!("failed to list build data of {}", uri))
}
