//! Config command implementation
//!
//! `qs config` prompts for the server URL and management token, verifies
//! them against the server and saves them. Subcommands inspect the stored
//! configuration.

use clap::{Parser, Subcommand};
use std::path::Path;

use super::ConfigSource;
use crate::config::{prompt_config, Config};
use crate::management::ManagementClient;

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the stored configuration (token redacted)
    Show {
        /// Output format: json or toml
        #[arg(short, long, default_value = "json", value_parser = ["json", "toml"])]
        format: String,
    },
    /// Show the configuration file path
    Path,
}

/// Run the config command
pub async fn run(args: ConfigArgs, source: ConfigSource, use_color: bool) -> anyhow::Result<()> {
    let path = Config::resolve_path(source.path.as_deref())?;
    match args.command {
        None => {
            let config = prompt_from_terminal()?;
            verify_and_save(&config, &path).await?;
            print_success("Configuration updated successfully!", use_color);
            Ok(())
        }
        Some(ConfigCommand::Show { format }) => show_config(&path, &format),
        Some(ConfigCommand::Path) => {
            let exists = if path.exists() { "" } else { " (not found)" };
            println!("{}{}", path.display(), exists);
            Ok(())
        }
    }
}

/// Ask the user for connection settings on stdin
pub fn prompt_from_terminal() -> anyhow::Result<Config> {
    println!("=== QuotaSense Configuration ===");
    let stdin = std::io::stdin();
    let config = prompt_config(stdin.lock(), std::io::stdout())?;
    Ok(config)
}

/// Check the settings against the server, then persist them
pub async fn verify_and_save(config: &Config, path: &Path) -> anyhow::Result<()> {
    let client = ManagementClient::new(config)?;
    println!("Verifying connection...");
    let count = client.check_connection().await?;
    tracing::debug!(accounts = count, "Connection verified");

    config.save_to(path)?;
    Ok(())
}

pub fn print_success(message: &str, use_color: bool) {
    if use_color {
        println!("\x1b[1;32m{}\x1b[0m", message);
    } else {
        println!("{}", message);
    }
}

fn show_config(path: &Path, format: &str) -> anyhow::Result<()> {
    let config = Config::load_from(path)?.redacted();
    let rendered = match format {
        "toml" => toml::to_string_pretty(&config)?,
        _ => serde_json::to_string_pretty(&config)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
