//! Data exchanged with the management server

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ProviderKind;

/// One provider credential known to the management server
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthFile {
    pub id: String,
    pub email: String,
    pub provider: String,
    pub disabled: bool,
    pub unavailable: bool,
    /// Opaque handle the proxy uses to pick the server-side credential
    pub auth_index: String,
    pub project_id: String,
    /// Display string, may embed a project id as `user@example.com (project)`
    pub account: String,
    pub id_token: IdToken,
}

impl AuthFile {
    pub fn provider_kind(&self) -> ProviderKind {
        ProviderKind::from_tag(&self.provider)
    }

    /// Whether this account should be queried for quota at all
    pub fn is_queryable(&self) -> bool {
        !self.disabled && !self.unavailable
    }
}

/// Identity token claims; only Codex accounts carry an account id here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdToken {
    pub chatgpt_account_id: String,
}

/// Body of `GET /v0/management/auth-files`
#[derive(Debug, Default, Deserialize)]
pub struct AuthFilesResponse {
    #[serde(default)]
    pub files: Vec<AuthFile>,
}

/// Request relayed by `POST /v0/management/api-call`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyRequest {
    #[serde(rename = "authIndex")]
    pub auth_index: String,
    pub method: String,
    pub url: String,
    pub header: BTreeMap<String, String>,
    pub data: String,
}

/// Envelope returned by the proxy endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyResponse {
    /// Status code of the target API, not of the proxy call
    pub status_code: u16,
    #[serde(default)]
    pub body: String,
}

/// Normalized quota for one (account, model) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLimit {
    /// Whole remaining percentage, e.g. `"42%"`
    pub remaining: String,
    /// Remaining quota in `[0, 1]`
    pub remaining_fraction: f64,
    /// RFC 3339 timestamp, empty when the reset time is unknown
    pub reset_time: String,
}

/// Quota per raw model id, ordered so rows render deterministically
pub type ModelLimits = BTreeMap<String, ModelLimit>;
