//! Display rules: curated model labels, reset countdowns and quota levels

use chrono::{DateTime, Utc};

use super::ProviderKind;

/// Curated labels per provider. Models missing from a provider's list are
/// hidden unless full mode is on.
const CURATED_MODELS: &[(&str, &[(&str, &str)])] = &[
    (
        "antigravity",
        &[
            ("gemini-3-pro-high", "Gemini 3 Pro"),
            ("gemini-3-flash", "Gemini 3 Flash"),
            ("claude-sonnet-4-5", "Claude/GPT"),
        ],
    ),
    (
        "gemini-cli",
        &[
            ("gemini-3-pro-preview", "Gemini Pro"),
            ("gemini-3-flash-preview", "Gemini Flash"),
        ],
    ),
];

fn curated_models(provider: &ProviderKind) -> Option<&'static [(&'static str, &'static str)]> {
    CURATED_MODELS
        .iter()
        .find(|(tag, _)| *tag == provider.tag())
        .map(|(_, models)| *models)
}

/// Label to show for a model, or `None` when the row should be omitted
///
/// Full mode returns the raw id untouched. Otherwise providers with a curated
/// list only show listed models, and providers without one get a title-cased id.
pub fn display_model_name(model_id: &str, provider: &ProviderKind, full_mode: bool) -> Option<String> {
    if full_mode {
        return Some(model_id.to_string());
    }

    match curated_models(provider) {
        Some(models) => models
            .iter()
            .find(|(id, _)| *id == model_id)
            .map(|(_, label)| label.to_string()),
        None => Some(title_case(model_id)),
    }
}

/// Upper-case the first letter of every word; words are split on anything
/// that is not alphanumeric or `_`
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Human countdown until `reset_time`
///
/// Empty or unparseable timestamps render as `-`, past ones as `Now`.
pub fn format_reset_in(reset_time: &str, now: DateTime<Utc>) -> String {
    if reset_time.is_empty() {
        return "-".to_string();
    }
    let Ok(reset) = DateTime::parse_from_rfc3339(reset_time) else {
        return "-".to_string();
    };

    let remaining = reset.with_timezone(&Utc) - now;
    if remaining.num_milliseconds() <= 0 {
        return "Now".to_string();
    }
    format_countdown_minutes(round_to_minutes(remaining.num_milliseconds()))
}

fn round_to_minutes(millis: i64) -> i64 {
    (millis + 30_000) / 60_000
}

fn format_countdown_minutes(total_minutes: i64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Traffic-light bucket for a remaining percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLevel {
    Healthy,
    Low,
    Critical,
}

impl QuotaLevel {
    /// Classify a whole remaining percentage
    pub fn from_percent(percent: i64) -> Self {
        if percent > 50 {
            QuotaLevel::Healthy
        } else if percent > 20 {
            QuotaLevel::Low
        } else {
            QuotaLevel::Critical
        }
    }

    /// Classify the displayed percentage string (`"42%"`)
    pub fn from_remaining(remaining: &str) -> Option<Self> {
        remaining
            .trim()
            .trim_end_matches('%')
            .parse::<i64>()
            .ok()
            .map(Self::from_percent)
    }

    /// Classify a remaining fraction by its whole percentage
    pub fn from_fraction(fraction: f64) -> Self {
        Self::from_percent((fraction * 100.0).floor() as i64)
    }

    /// ANSI style prefix for this level
    pub fn ansi(&self) -> &'static str {
        match self {
            QuotaLevel::Healthy => "\x1b[32m",
            QuotaLevel::Low => "\x1b[33m",
            QuotaLevel::Critical => "\x1b[1;31m",
        }
    }
}
