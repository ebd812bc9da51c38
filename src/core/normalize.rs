//! Quota normalization
//!
//! Maps the three upstream quota layouts onto one [`ModelLimit`] per model:
//! - Cloud Code `fetchAvailableModels` (Antigravity and generic providers)
//! - Gemini CLI `retrieveUserQuota` buckets
//! - Codex rate-limit windows from the ChatGPT usage endpoint

use chrono::{DateTime, SecondsFormat};
use serde::Deserialize;
use std::collections::HashMap;

use super::{ModelLimit, ModelLimits, QuotaError, QuotaShape};

/// Model key used for Codex accounts whose plan type is empty
const CODEX_FALLBACK_MODEL: &str = "codex";

/// Normalize a raw upstream body according to the provider's response shape
pub fn normalize(shape: QuotaShape, body: &str) -> Result<ModelLimits, QuotaError> {
    match shape {
        QuotaShape::CloudCodeModels => normalize_cloud_code(body),
        QuotaShape::GeminiBuckets => normalize_gemini_buckets(body),
        QuotaShape::CodexRateLimit => normalize_codex(body),
    }
}

/// Build a limit from a remaining fraction, clamping it into `[0, 1]`
pub fn limit_from_fraction(fraction: f64, reset_time: String) -> ModelLimit {
    let fraction = clamp_fraction(fraction);
    ModelLimit {
        remaining: format!("{}%", (fraction * 100.0).floor() as i64),
        remaining_fraction: fraction,
        reset_time,
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0)
}

fn normalize_cloud_code(body: &str) -> Result<ModelLimits, QuotaError> {
    let resp: AvailableModelsResponse = serde_json::from_str(body)?;

    let limits = resp
        .models
        .into_iter()
        .filter_map(|(key, model)| {
            let quota = model.quota_info?;
            let limit = limit_from_fraction(
                quota.remaining_fraction.unwrap_or(0.0),
                quota.reset_time.unwrap_or_default(),
            );
            Some((key, limit))
        })
        .collect();

    Ok(limits)
}

fn normalize_gemini_buckets(body: &str) -> Result<ModelLimits, QuotaError> {
    let resp: GeminiQuotaResponse = serde_json::from_str(body)?;

    let limits = resp
        .buckets
        .into_iter()
        .filter(|bucket| !bucket.model_id.is_empty())
        .map(|bucket| {
            let limit = limit_from_fraction(
                bucket.remaining_fraction.unwrap_or(0.0),
                bucket.reset_time.unwrap_or_default(),
            );
            (bucket.model_id, limit)
        })
        .collect();

    Ok(limits)
}

fn normalize_codex(body: &str) -> Result<ModelLimits, QuotaError> {
    let resp: CodexUsageResponse = serde_json::from_str(body)?;

    let model = if resp.plan_type.is_empty() {
        CODEX_FALLBACK_MODEL.to_string()
    } else {
        resp.plan_type
    };

    let window = resp
        .rate_limit
        .and_then(|r| r.primary_window)
        .unwrap_or_default();

    let used = window.used_percent.filter(|v| v.is_finite()).unwrap_or(0.0);
    let remaining_percent = (100.0 - used).clamp(0.0, 100.0);

    let reset_time = window
        .reset_at
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    let limit = ModelLimit {
        remaining: format!("{}%", remaining_percent.floor() as i64),
        remaining_fraction: remaining_percent / 100.0,
        reset_time,
    };

    let mut limits = ModelLimits::new();
    limits.insert(model, limit);
    Ok(limits)
}

// Upstream response types

#[derive(Debug, Deserialize)]
struct AvailableModelsResponse {
    #[serde(default)]
    models: HashMap<String, CloudCodeModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudCodeModel {
    #[serde(default)]
    quota_info: Option<CloudCodeQuotaInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudCodeQuotaInfo {
    #[serde(default)]
    remaining_fraction: Option<f64>,
    #[serde(default)]
    reset_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiQuotaResponse {
    #[serde(default)]
    buckets: Vec<GeminiBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBucket {
    #[serde(default)]
    model_id: String,
    #[serde(default)]
    remaining_fraction: Option<f64>,
    #[serde(default)]
    reset_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CodexUsageResponse {
    #[serde(default)]
    plan_type: String,
    #[serde(default)]
    rate_limit: Option<CodexRateLimit>,
}

#[derive(Debug, Deserialize)]
struct CodexRateLimit {
    #[serde(default)]
    primary_window: Option<CodexWindow>,
}

#[derive(Debug, Default, Deserialize)]
struct CodexWindow {
    #[serde(default)]
    used_percent: Option<f64>,
    #[serde(default)]
    reset_at: Option<i64>,
}
