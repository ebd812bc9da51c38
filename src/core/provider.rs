//! Provider tags reported by the management server

use std::fmt;

/// Which upstream quota API an account talks to
///
/// The management server tags each credential with a free-form provider
/// string. Three of them have dedicated quota endpoints; anything else is
/// queried through the generic Cloud Code endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Antigravity,
    GeminiCli,
    Codex,
    Other(String),
}

impl ProviderKind {
    /// Parse the provider tag of an account
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "antigravity" => ProviderKind::Antigravity,
            "gemini-cli" => ProviderKind::GeminiCli,
            "codex" => ProviderKind::Codex,
            _ => ProviderKind::Other(tag.trim().to_string()),
        }
    }

    /// Tag as used on the wire and in the table
    pub fn tag(&self) -> &str {
        match self {
            ProviderKind::Antigravity => "antigravity",
            ProviderKind::GeminiCli => "gemini-cli",
            ProviderKind::Codex => "codex",
            ProviderKind::Other(tag) => tag,
        }
    }

    /// Shape of the quota response this provider returns
    pub fn quota_shape(&self) -> QuotaShape {
        match self {
            ProviderKind::GeminiCli => QuotaShape::GeminiBuckets,
            ProviderKind::Codex => QuotaShape::CodexRateLimit,
            ProviderKind::Antigravity | ProviderKind::Other(_) => QuotaShape::CloudCodeModels,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The three upstream response layouts the normalizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaShape {
    /// `fetchAvailableModels`: model key -> `{displayName, quotaInfo}`
    CloudCodeModels,
    /// `retrieveUserQuota`: `{buckets: [...]}`
    GeminiBuckets,
    /// ChatGPT usage: `{plan_type, rate_limit: {primary_window}}`
    CodexRateLimit,
}
