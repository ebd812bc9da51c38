//! Quota command implementation (the default `qs` run)

use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};

use super::config::{print_success, prompt_from_terminal, verify_and_save};
use super::{use_color, ConfigSource};
use crate::config::Config;
use crate::management::{ManagementClient, QuotaSource};
use crate::render::{render_quota_table, write_header, RenderOptions};

/// Arguments for the quota table
#[derive(Debug, Clone, Default)]
pub struct QuotaArgs {
    /// Show every model instead of the curated list
    pub full: bool,
    pub no_color: bool,
    pub source: ConfigSource,
}

/// Run the quota command
pub async fn run(args: QuotaArgs) -> anyhow::Result<()> {
    let color = use_color(args.no_color);
    let config = load_or_setup(&args.source, color).await?;
    let client = ManagementClient::new(&config)?;

    println!("Fetching usage information...");
    let accounts = client.fetch_accounts().await?;
    tracing::debug!(accounts = accounts.len(), full = args.full, "Rendering quota table");

    let mut stdout = std::io::stdout();
    writeln!(stdout)?;
    write_header(&mut stdout, color)?;

    let opts = RenderOptions {
        full_mode: args.full,
        use_color: color,
    };
    let summary = render_quota_table(
        Arc::new(client),
        accounts,
        opts,
        Arc::new(Mutex::new(stdout)),
    )
    .await;
    tracing::debug!(
        queried = summary.queried,
        failed = summary.failed,
        rows = summary.rows,
        "Quota table complete"
    );

    if summary.queried == 0 {
        println!("No enabled accounts found.");
    }
    if summary.failed > 0 {
        eprintln!("{} account(s) could not be queried", summary.failed);
    }

    Ok(())
}

/// Load the stored config, falling back to overrides or an interactive setup
async fn load_or_setup(source: &ConfigSource, color: bool) -> anyhow::Result<Config> {
    let path = Config::resolve_path(source.path.as_deref())?;

    let stored_error = match Config::load_from(&path) {
        Ok(stored) => {
            let config = stored
                .with_overrides(source.server_url.clone(), source.management_token.clone())
                .validated()?;
            return Ok(config);
        }
        Err(e) => e,
    };
    tracing::debug!(path = %path.display(), error = %stored_error, "No usable stored config");

    if let Some(config) = config_from_overrides(source) {
        return Ok(config);
    }

    if !super::is_terminal() || !std::io::stdin().is_terminal() {
        return Err(stored_error.into());
    }

    let config = prompt_from_terminal()?;
    verify_and_save(&config, &path).await?;
    print_success("Configuration saved successfully!", color);
    Ok(config)
}

/// A complete config built only from flags/env, if both values were given
fn config_from_overrides(source: &ConfigSource) -> Option<Config> {
    Config::default()
        .with_overrides(source.server_url.clone(), source.management_token.clone())
        .validated()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QuotaError;

    #[test]
    fn test_overrides_alone_can_form_a_config() {
        let source = ConfigSource {
            path: None,
            server_url: Some("http://localhost:8317/".to_string()),
            management_token: Some("tok".to_string()),
        };
        let config = config_from_overrides(&source).unwrap();
        assert_eq!(config.server_url, "http://localhost:8317");
    }

    #[test]
    fn test_partial_overrides_are_not_enough() {
        let source = ConfigSource {
            path: None,
            server_url: Some("http://localhost:8317".to_string()),
            management_token: None,
        };
        assert!(config_from_overrides(&source).is_none());
    }

    #[tokio::test]
    async fn test_stored_config_is_merged_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qs.json");
        Config {
            server_url: "http://stored:8317".to_string(),
            management_token: "stored-token".to_string(),
        }
        .save_to(&path)
        .unwrap();

        let source = ConfigSource {
            path: Some(path),
            server_url: None,
            management_token: Some("override-token".to_string()),
        };
        let config = load_or_setup(&source, false).await.unwrap();
        assert_eq!(config.server_url, "http://stored:8317");
        assert_eq!(config.management_token, "override-token");
    }

    #[tokio::test]
    async fn test_invalid_override_on_valid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qs.json");
        Config {
            server_url: "http://stored:8317".to_string(),
            management_token: "stored-token".to_string(),
        }
        .save_to(&path)
        .unwrap();

        let source = ConfigSource {
            path: Some(path),
            server_url: Some("ftp://nope".to_string()),
            management_token: None,
        };
        let err = load_or_setup(&source, false).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<QuotaError>(), Some(QuotaError::Config(_))));
    }
}
