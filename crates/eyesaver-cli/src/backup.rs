//! Best-effort upload of the original file before it is recolored.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use tracing::{debug, warn};

use eyesaver_core::models::config::BackupConfig;

/// Result of a backup attempt. A backup never fails the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Stored; `url` is where the server says the object lives, if it said.
    Stored { url: Option<String> },
    /// No endpoint configured.
    Skipped,
    /// The upload did not succeed.
    Failed(String),
}

/// Uploads objects with `PUT {endpoint}/{name}`.
pub struct HttpBackup {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpBackup {
    /// Build an uploader, or `None` when no endpoint is configured.
    pub fn from_config(config: &BackupConfig) -> anyhow::Result<Option<Self>> {
        let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .user_agent(concat!("eyesaver-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Some(Self {
            client,
            endpoint: endpoint.to_string(),
            token,
        }))
    }

    pub async fn upload(&self, data: Vec<u8>, name: &str) -> BackupOutcome {
        let url = object_url(&self.endpoint, name);
        debug!("Uploading {} bytes to {}", data.len(), url);

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/pdf")
            .body(data);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Backup upload to {} failed: {}", url, e);
                return BackupOutcome::Failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            warn!("Backup upload to {} returned {}", url, response.status());
            return BackupOutcome::Failed(format!("HTTP {}", response.status()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        BackupOutcome::Stored { url: location }
    }
}

/// Join the endpoint and object name with exactly one slash.
fn object_url(endpoint: &str, name: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}
