//! Concurrent quota table
//!
//! One task per queryable account fetches and normalizes quota, then writes
//! that account's rows as a single block while holding the output lock. A
//! failing account contributes no rows and never stops the others.

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{display_model_name, format_reset_in, AuthFile, ModelLimits, QuotaLevel};
use crate::management::QuotaSource;

const ACCOUNT_WIDTH: usize = 40;
const PROVIDER_WIDTH: usize = 15;
const REMAINING_WIDTH: usize = 10;
const RESET_WIDTH: usize = 15;
const MODEL_WIDTH: usize = 20;

const ANSI_RESET: &str = "\x1b[0m";
const HEADER_STYLE: &str = "\x1b[1;36m";

/// Rendering switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show every model under its raw id
    pub full_mode: bool,
    pub use_color: bool,
}

/// Outcome of one table run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Accounts a fetch was launched for
    pub queried: usize,
    /// Accounts whose fetch failed
    pub failed: usize,
    /// Rows written across all accounts
    pub rows: usize,
}

/// Write the column header and separator
pub fn write_header<W: Write>(out: &mut W, use_color: bool) -> io::Result<()> {
    let header = format!(
        "{:<aw$} | {:<pw$} | {:<rw$} | {:<sw$} | {:<mw$}",
        "Account (Email)",
        "Provider",
        "Remaining",
        "Reset In",
        "Model",
        aw = ACCOUNT_WIDTH,
        pw = PROVIDER_WIDTH,
        rw = REMAINING_WIDTH,
        sw = RESET_WIDTH,
        mw = MODEL_WIDTH,
    );
    let rule = "-".repeat(header.len());

    if use_color {
        writeln!(out, "{}{}{}", HEADER_STYLE, header, ANSI_RESET)?;
        writeln!(out, "{}{}{}", HEADER_STYLE, rule, ANSI_RESET)
    } else {
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", rule)
    }
}

/// Format the rows for one account, skipping models the display filter omits
pub fn account_rows(
    file: &AuthFile,
    limits: &ModelLimits,
    opts: RenderOptions,
    now: DateTime<Utc>,
) -> Vec<String> {
    let provider = file.provider_kind();

    limits
        .iter()
        .filter_map(|(model_id, limit)| {
            let label = display_model_name(model_id, &provider, opts.full_mode)?;
            let remaining = format!("{:<w$}", limit.remaining, w = REMAINING_WIDTH);
            let remaining = if opts.use_color {
                let level = QuotaLevel::from_remaining(&limit.remaining)
                    .unwrap_or_else(|| QuotaLevel::from_fraction(limit.remaining_fraction));
                format!("{}{}{}", level.ansi(), remaining, ANSI_RESET)
            } else {
                remaining
            };

            Some(format!(
                "{:<aw$} | {:<pw$} | {} | {:<sw$} | {}",
                file.email,
                provider.tag(),
                remaining,
                format_reset_in(&limit.reset_time, now),
                label,
                aw = ACCOUNT_WIDTH,
                pw = PROVIDER_WIDTH,
                sw = RESET_WIDTH,
            ))
        })
        .collect()
}

fn lock_output<W>(out: &Mutex<W>) -> MutexGuard<'_, W> {
    match out.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_block<W: Write>(out: &Mutex<W>, rows: &[String]) -> io::Result<()> {
    let mut guard = lock_output(out);
    for row in rows {
        writeln!(guard, "{}", row)?;
    }
    guard.flush()
}

/// Fetch quota for every queryable account concurrently and print its rows
///
/// Returns once every task has finished.
pub async fn render_quota_table<S, W>(
    source: Arc<S>,
    accounts: Vec<AuthFile>,
    opts: RenderOptions,
    out: Arc<Mutex<W>>,
) -> RenderSummary
where
    S: QuotaSource + ?Sized + 'static,
    W: Write + Send + 'static,
{
    let handles: Vec<_> = accounts
        .into_iter()
        .filter(AuthFile::is_queryable)
        .map(|file| {
            let source = Arc::clone(&source);
            let out = Arc::clone(&out);
            tokio::spawn(async move {
                let limits = match source.fetch_quota(&file).await {
                    Ok(limits) => limits,
                    Err(e) => {
                        tracing::debug!(
                            id = %file.id,
                            email = %file.email,
                            provider = %file.provider,
                            error = %e,
                            "Skipping account"
                        );
                        return None;
                    }
                };

                let rows = account_rows(&file, &limits, opts, Utc::now());
                if let Err(e) = write_block(&*out, &rows) {
                    tracing::warn!(email = %file.email, error = %e, "Failed to write rows");
                }
                Some(rows.len())
            })
        })
        .collect();

    let mut summary = RenderSummary {
        queried: handles.len(),
        ..Default::default()
    };

    for result in futures::future::join_all(handles).await {
        match result {
            Ok(Some(rows)) => summary.rows += rows,
            Ok(None) => summary.failed += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Quota task aborted");
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{limit_from_fraction, ModelLimit, QuotaError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory source keyed by account id; missing ids fail with an upstream error
    struct FakeSource {
        quotas: HashMap<String, ModelLimits>,
        delay: Duration,
    }

    #[async_trait]
    impl QuotaSource for FakeSource {
        async fn fetch_accounts(&self) -> Result<Vec<AuthFile>, QuotaError> {
            Ok(Vec::new())
        }

        async fn fetch_quota(&self, file: &AuthFile) -> Result<ModelLimits, QuotaError> {
            tokio::time::sleep(self.delay).await;
            self.quotas
                .get(&file.id)
                .cloned()
                .ok_or(QuotaError::Upstream { status: 500 })
        }
    }

    fn account(id: &str, provider: &str) -> AuthFile {
        AuthFile {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    fn limits(models: &[(&str, f64)]) -> ModelLimits {
        models
            .iter()
            .map(|(model, fraction)| (model.to_string(), limit_from_fraction(*fraction, String::new())))
            .collect()
    }

    fn plain() -> RenderOptions {
        RenderOptions {
            full_mode: true,
            use_color: false,
        }
    }

    fn output_lines(out: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
        let bytes = lock_output(&**out).clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_account_contributes_no_rows() {
        let mut quotas = HashMap::new();
        quotas.insert("a".to_string(), limits(&[("m1", 0.9), ("m2", 0.5)]));
        quotas.insert("c".to_string(), limits(&[("m1", 0.1), ("m2", 0.2), ("m3", 0.3)]));
        let source = Arc::new(FakeSource {
            quotas,
            delay: Duration::from_millis(5),
        });

        let accounts = vec![account("a", "codex"), account("b", "codex"), account("c", "codex")];
        let out = Arc::new(Mutex::new(Vec::new()));
        let summary = render_quota_table(source, accounts, plain(), Arc::clone(&out)).await;

        assert_eq!(
            summary,
            RenderSummary {
                queried: 3,
                failed: 1,
                rows: 5
            }
        );
        let lines = output_lines(&out);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| !l.starts_with("b@example.com")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rows_for_one_account_are_contiguous() {
        let models: Vec<(String, f64)> = (0..20).map(|i| (format!("model-{:02}", i), 0.5)).collect();
        let model_refs: Vec<(&str, f64)> = models.iter().map(|(m, f)| (m.as_str(), *f)).collect();

        let mut quotas = HashMap::new();
        let accounts: Vec<AuthFile> = (0..8)
            .map(|i| {
                let id = format!("acct{}", i);
                quotas.insert(id.clone(), limits(&model_refs));
                account(&id, "codex")
            })
            .collect();
        let source = Arc::new(FakeSource {
            quotas,
            delay: Duration::from_millis(1),
        });

        let out = Arc::new(Mutex::new(Vec::new()));
        let summary = render_quota_table(source, accounts, plain(), Arc::clone(&out)).await;
        assert_eq!(summary.rows, 160);

        let owners: Vec<String> = output_lines(&out)
            .iter()
            .map(|l| l.split(" | ").next().unwrap().trim().to_string())
            .collect();
        let mut seen = Vec::new();
        for owner in owners {
            if seen.last() != Some(&owner) {
                assert!(!seen.contains(&owner), "rows for {} were interleaved", owner);
                seen.push(owner);
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_disabled_and_unavailable_accounts_are_not_queried() {
        let mut quotas = HashMap::new();
        quotas.insert("a".to_string(), limits(&[("m1", 0.9)]));
        quotas.insert("b".to_string(), limits(&[("m1", 0.9)]));
        quotas.insert("c".to_string(), limits(&[("m1", 0.9)]));
        let source = Arc::new(FakeSource {
            quotas,
            delay: Duration::ZERO,
        });

        let mut disabled = account("b", "codex");
        disabled.disabled = true;
        let mut unavailable = account("c", "codex");
        unavailable.unavailable = true;

        let out = Arc::new(Mutex::new(Vec::new()));
        let summary = tokio_test::block_on(render_quota_table(
            source,
            vec![account("a", "codex"), disabled, unavailable],
            plain(),
            Arc::clone(&out),
        ));

        assert_eq!(summary.queried, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(output_lines(&out).len(), 1);
    }

    #[tokio::test]
    async fn test_curated_mode_hides_unlisted_models() {
        let mut quotas = HashMap::new();
        quotas.insert(
            "a".to_string(),
            limits(&[("gemini-3-pro-high", 0.8), ("chat_20706", 1.0), ("gemini-3-flash", 0.3)]),
        );
        let source = Arc::new(FakeSource {
            quotas,
            delay: Duration::ZERO,
        });

        let out = Arc::new(Mutex::new(Vec::new()));
        let opts = RenderOptions {
            full_mode: false,
            use_color: false,
        };
        let summary = render_quota_table(source, vec![account("a", "antigravity")], opts, Arc::clone(&out)).await;

        assert_eq!(summary.rows, 2);
        let lines = output_lines(&out);
        assert!(lines[0].ends_with("Gemini 3 Flash"));
        assert!(lines[1].ends_with("Gemini 3 Pro"));
    }

    #[test]
    fn test_account_row_layout() {
        let mut quota = ModelLimits::new();
        quota.insert(
            "plus".to_string(),
            ModelLimit {
                remaining: "42%".to_string(),
                remaining_fraction: 0.42,
                reset_time: String::new(),
            },
        );
        let rows = account_rows(
            &account("alice", "codex"),
            &quota,
            RenderOptions {
                full_mode: false,
                use_color: false,
            },
            Utc::now(),
        );

        assert_eq!(rows.len(), 1);
        let cols: Vec<&str> = rows[0].split(" | ").map(str::trim).collect();
        assert_eq!(cols, vec!["alice@example.com", "codex", "42%", "-", "Plus"]);
    }

    #[test]
    fn test_colored_row_wraps_remaining_only() {
        let quota = limits(&[("m", 0.1)]);
        let opts = RenderOptions {
            full_mode: true,
            use_color: true,
        };
        let rows = account_rows(&account("a", "codex"), &quota, opts, Utc::now());
        assert!(rows[0].contains("\x1b[1;31m10%"));
        assert!(rows[0].starts_with("a@example.com"));
    }

    #[test]
    fn test_color_follows_displayed_percentage() {
        // The fraction floors to 50 but the row shows 51%, which is what gets colored
        let mut quota = ModelLimits::new();
        quota.insert(
            "plus".to_string(),
            ModelLimit {
                remaining: "51%".to_string(),
                remaining_fraction: 0.509_999_999,
                reset_time: String::new(),
            },
        );
        let opts = RenderOptions {
            full_mode: true,
            use_color: true,
        };
        let rows = account_rows(&account("a", "codex"), &quota, opts, Utc::now());
        assert!(rows[0].contains("\x1b[32m51%"));
    }

    #[test]
    fn test_header_rule_matches_header_width() {
        let mut out = Vec::new();
        write_header(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Account (Email)"));
        assert_eq!(lines[0].len(), lines[1].len());
    }
}
