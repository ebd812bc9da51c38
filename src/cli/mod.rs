//! CLI module - command-line interface
//!
//! - `qs` - print the quota table (default command)
//! - `qs config` - set up or inspect the server connection
//! - `qs version` - print build information
//! - `qs update` - check GitHub for a newer release

pub mod config;
pub mod quota;
pub mod update;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const CONNECTION_ERROR: i32 = 3;
    pub const UPSTREAM_ERROR: i32 = 4;
    pub const PARSE_ERROR: i32 = 5;
}

/// QuotaSense CLI - Monitor your AI model usage
///
/// Lists the accounts configured on a management server and shows the
/// remaining quota of each model. Defaults to the quota table when no
/// subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "qs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // === Global flags ===

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable logs (JSON) to stderr
    #[arg(long = "json-output", global = true)]
    pub json_output: bool,

    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to the config file (default: ~/.quota-sense.json)
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Management server URL, overrides the stored value
    #[arg(long = "server-url", env = "QS_SERVER_URL", global = true, hide_env_values = true)]
    pub server_url: Option<String>,

    /// Management token, overrides the stored value
    #[arg(long = "management-token", env = "QS_MANAGEMENT_TOKEN", global = true, hide_env_values = true)]
    pub management_token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Top-level args for the default quota command ===

    /// Display all available models
    #[arg(short, long)]
    pub full: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure remote server connection
    Config(config::ConfigArgs),

    /// Print the version number of QuotaSense CLI
    Version,

    /// Check for a newer QuotaSense CLI release
    Update,
}

/// Where the connection settings come from
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub path: Option<PathBuf>,
    pub server_url: Option<String>,
    pub management_token: Option<String>,
}

impl Cli {
    pub fn config_source(&self) -> ConfigSource {
        ConfigSource {
            path: self.config_path.clone(),
            server_url: self.server_url.clone(),
            management_token: self.management_token.clone(),
        }
    }

    /// Convert top-level args to QuotaArgs for the default command
    pub fn to_quota_args(&self) -> quota::QuotaArgs {
        quota::QuotaArgs {
            full: self.full,
            no_color: self.no_color,
            source: self.config_source(),
        }
    }
}

/// Check if stdout is a terminal
pub fn is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}

/// Colors are on for terminals unless disabled by flag or `NO_COLOR`
pub fn use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var_os("NO_COLOR").is_none() && is_terminal()
}

/// Print the version banner
pub fn print_version() {
    println!(
        "QuotaSense CLI v{} ({}, built {})",
        crate::updater::current_version(),
        env!("QS_GIT_COMMIT"),
        env!("QS_BUILD_DATE"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_with_full_flag() {
        let cli = Cli::try_parse_from(["qs", "-f"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.to_quota_args().full);
    }

    #[test]
    fn test_long_full_flag_and_globals() {
        let cli = Cli::try_parse_from(["qs", "--full", "--no-color", "--config", "/tmp/qs.json"]).unwrap();
        let args = cli.to_quota_args();
        assert!(args.full);
        assert!(args.no_color);
        assert_eq!(args.source.path, Some(PathBuf::from("/tmp/qs.json")));
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["qs", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Version)));

        let cli = Cli::try_parse_from(["qs", "update", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Update)));
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["qs", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config(_))));
    }

    #[test]
    fn test_use_color_respects_flag() {
        assert!(!use_color(true));
    }
}
