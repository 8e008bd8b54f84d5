//! HTTP transport for the update service.
//!
//! Talks to an update server laid out as `{endpoint}/{project}/...`:
//!
//! - `GET {project}/latest` returns the newest revision number as plain text
//! - `GET {project}/changes?from=A&to=B` returns a JSON object mapping
//!   relative paths to byte sizes
//! - `GET {project}/files/{version}/{path}` returns the raw file bytes
//!
//! Transport failures (connection, DNS, timeout, HTTP error statuses) map to
//! [`LiftoffError::Network`]; a server that answers with something the
//! protocol does not expect maps to [`LiftoffError::InvalidServerResponse`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{ChangeSet, UpdateService};
use crate::core::LiftoffError;
use crate::utils::fs::ensure_dir;
use crate::version::Version;

/// Update service client for one project on one server.
#[derive(Debug, Clone)]
pub struct HttpUpdateService {
    client: reqwest::Client,
    endpoint: String,
    project: String,
}

impl HttpUpdateService {
    /// Create a client for `project` hosted under `endpoint`.
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project: project.into(),
        }
    }

    /// The project this client updates.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.project, tail)
    }

    async fn get(&self, operation: &str, url: &str) -> Result<reqwest::Response> {
        let network_error = |reason: String| LiftoffError::Network {
            operation: operation.to_string(),
            reason,
        };

        let response =
            self.client.get(url).send().await.map_err(|e| network_error(e.to_string()))?;

        response.error_for_status().map_err(|e| network_error(e.to_string()).into())
    }
}

#[async_trait]
impl UpdateService for HttpUpdateService {
    async fn latest_version(&self) -> Result<Version> {
        let url = self.url("latest");
        debug!("querying latest version: {url}");

        let body = self
            .get("latest version check", &url)
            .await?
            .text()
            .await
            .map_err(|e| LiftoffError::Network {
                operation: "latest version check".to_string(),
                reason: e.to_string(),
            })?;

        body.trim().parse().map_err(|_| {
            LiftoffError::InvalidServerResponse {
                operation: "latest version check".to_string(),
                reason: format!("expected a revision number, got {body:?}"),
            }
            .into()
        })
    }

    async fn changes(&self, from: Version, to: Version) -> Result<ChangeSet> {
        let url = self.url(&format!("changes?from={}&to={}", from.as_u64(), to.as_u64()));
        debug!("fetching change listing: {url}");

        let response = self.get("change listing", &url).await?;

        response.json::<ChangeSet>().await.map_err(|e| {
            LiftoffError::InvalidServerResponse {
                operation: "change listing".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn download(&self, relative_path: &str, dest: &Path, version: Version) -> Result<()> {
        // The wire path always uses forward slashes, whatever separator the
        // change listing carried.
        let wire_path = relative_path.replace('\\', "/");
        let url = self.url(&format!("files/{}/{}", version.as_u64(), wire_path));
        debug!("downloading {relative_path}: {url}");

        let operation = format!("download of {relative_path}");
        let response = self.get(&operation, &url).await?;

        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LiftoffError::Network {
                operation: operation.clone(),
                reason: e.to_string(),
            })?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }

        file.flush().await.with_context(|| format!("Failed to flush {}", dest.display()))?;

        Ok(())
    }
}
