//! HTTP client for the management server

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::{envelope, QuotaSource};
use crate::config::Config;
use crate::core::{normalize, AuthFile, AuthFilesResponse, ModelLimits, ProxyResponse, QuotaError};

const AUTH_FILES_PATH: &str = "/v0/management/auth-files";
const API_CALL_PATH: &str = "/v0/management/api-call";

const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const QUOTA_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the `/v0/management` API
pub struct ManagementClient {
    http: reqwest::Client,
    server_url: String,
    management_token: String,
}

impl ManagementClient {
    pub fn new(config: &Config) -> Result<Self, QuotaError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("quota-sense/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuotaError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            management_token: config.management_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Verify the server is reachable and the token is accepted
    pub async fn check_connection(&self) -> Result<usize, QuotaError> {
        let files = self.fetch_accounts().await.map_err(|e| match e {
            QuotaError::Connection(msg) => {
                QuotaError::Connection(format!("failed to connect to server or invalid token: {}", msg))
            }
            other => other,
        })?;
        Ok(files.len())
    }
}

#[async_trait]
impl QuotaSource for ManagementClient {
    async fn fetch_accounts(&self) -> Result<Vec<AuthFile>, QuotaError> {
        let url = self.endpoint(AUTH_FILES_PATH);
        tracing::debug!(%url, "Fetching auth files");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.management_token)
            .timeout(LIST_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(QuotaError::Connection(format!(
                "failed to fetch auth files: {}",
                status.as_u16()
            )));
        }

        let text = resp.text().await?;
        let parsed: AuthFilesResponse = serde_json::from_str(&text)?;
        tracing::debug!(count = parsed.files.len(), "Fetched auth files");
        Ok(parsed.files)
    }

    async fn fetch_quota(&self, file: &AuthFile) -> Result<ModelLimits, QuotaError> {
        let request = envelope::quota_request(file);
        tracing::debug!(
            provider = %file.provider,
            auth_index = %file.auth_index,
            target = %request.url,
            "Fetching quota through proxy"
        );

        let resp = self
            .http
            .post(self.endpoint(API_CALL_PATH))
            .bearer_auth(&self.management_token)
            .timeout(QUOTA_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let body = unwrap_proxy_response(status, &text)?;

        normalize(file.provider_kind().quota_shape(), &body)
    }
}

/// Check both status layers of a proxy reply and return the upstream body
fn unwrap_proxy_response(http_status: u16, text: &str) -> Result<String, QuotaError> {
    if http_status != 200 {
        return Err(QuotaError::Connection(format!(
            "management server returned status {}",
            http_status
        )));
    }

    let envelope: ProxyResponse = serde_json::from_str(text)?;
    if envelope.status_code != 200 {
        return Err(QuotaError::Upstream {
            status: envelope.status_code,
        });
    }
    Ok(envelope.body)
}
