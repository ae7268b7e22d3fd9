//! Latest-release lookup against the hosting service.
//!
//! Lookup failures are never fatal: the caller falls back to the tip of the
//! default branch and continues.

use crate::config::PullConfig;
use crate::error::{PullError, PullResult};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct LatestReleaseResponse {
    tag_name: Option<String>,
}

/// Client for the "latest release" endpoint
pub struct ReleaseClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl ReleaseClient {
    pub fn new(config: &PullConfig) -> PullResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent("ocap-sync")
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.releases_api_url.clone(),
        })
    }

    /// Fetch the most recent release tag.
    ///
    /// Timeouts, connection errors, non-2xx statuses, and a missing or empty
    /// `tag_name` field all surface as `ReleaseLookup` so the caller can fall
    /// back to the default branch.
    pub async fn latest_tag(&self) -> PullResult<String> {
        debug!("Querying latest release: {}", self.api_url);

        let response = self
            .http_client
            .get(&self.api_url)
            .send()
            .await
            .map_err(|e| PullError::ReleaseLookup {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PullError::ReleaseLookup {
                reason: format!("endpoint returned HTTP {}", status),
            });
        }

        let body: LatestReleaseResponse =
            response.json().await.map_err(|e| PullError::ReleaseLookup {
                reason: format!("malformed response body: {}", e),
            })?;

        match body.tag_name {
            Some(tag) if !tag.is_empty() => {
                debug!("Latest release tag: {}", tag);
                Ok(tag)
            }
            _ => {
                warn!("Release response carried no tag_name field");
                Err(PullError::ReleaseLookup {
                    reason: "response carried no tag_name field".to_string(),
                })
            }
        }
    }
}
