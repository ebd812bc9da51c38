//! Proxy envelopes for each provider's quota endpoint
//!
//! The management server relays these requests upstream and swaps the
//! `$TOKEN$` placeholder for the stored provider credential. The client never
//! sees that credential.

use std::collections::BTreeMap;

use crate::core::{AuthFile, ProviderKind, ProxyRequest};

const CLOUD_CODE_MODELS_URL: &str =
    "https://daily-cloudcode-pa.googleapis.com/v1internal:fetchAvailableModels";
const GEMINI_QUOTA_URL: &str = "https://cloudcode-pa.googleapis.com/v1internal:retrieveUserQuota";
const CHATGPT_USAGE_URL: &str = "https://chatgpt.com/backend-api/wham/usage";

const ANTIGRAVITY_USER_AGENT: &str = "antigravity/1.11.5 darwin/amd64";
const CODEX_USER_AGENT: &str = "codex_cli_rs/0.76.0 (Debian 13.0.0; x86_64) WindowsTerminal";

/// Header value substituted server-side with the real provider token
pub const TOKEN_PLACEHOLDER: &str = "$TOKEN$";

/// Build the proxy request that fetches quota for one account
pub fn quota_request(file: &AuthFile) -> ProxyRequest {
    let mut header = BTreeMap::new();
    header.insert("Authorization".to_string(), format!("Bearer {}", TOKEN_PLACEHOLDER));
    header.insert("Content-Type".to_string(), "application/json".to_string());

    let (method, url, data) = match file.provider_kind() {
        ProviderKind::Codex => {
            header.insert("User-Agent".to_string(), CODEX_USER_AGENT.to_string());
            header.insert(
                "Chatgpt-Account-Id".to_string(),
                file.id_token.chatgpt_account_id.clone(),
            );
            ("GET", CHATGPT_USAGE_URL, String::new())
        }
        ProviderKind::GeminiCli => {
            let body = serde_json::json!({ "project": resolve_project_id(file) });
            ("POST", GEMINI_QUOTA_URL, body.to_string())
        }
        ProviderKind::Antigravity | ProviderKind::Other(_) => {
            header.insert("User-Agent".to_string(), ANTIGRAVITY_USER_AGENT.to_string());
            ("POST", CLOUD_CODE_MODELS_URL, "{}".to_string())
        }
    };

    ProxyRequest {
        auth_index: file.auth_index.clone(),
        method: method.to_string(),
        url: url.to_string(),
        header,
        data,
    }
}

/// Project id for Gemini CLI quota calls
///
/// Falls back to the first parenthesised part of the account display string,
/// e.g. `alice@example.com (proj-123)`. Returns an empty string when neither
/// source has one.
pub fn resolve_project_id(file: &AuthFile) -> String {
    if !file.project_id.is_empty() {
        return file.project_id.clone();
    }
    parenthesized(&file.account).unwrap_or_default().to_string()
}

fn parenthesized(s: &str) -> Option<&str> {
    let start = s.find('(')?;
    let end = s.find(')')?;
    (end > start).then(|| &s[start + 1..end])
}
