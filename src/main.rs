//! QuotaSense - terminal client for AI provider quotas
//!
//! Asks a remote management server for the configured provider accounts,
//! fetches each account's quota through the server's proxy and prints a
//! table of remaining quota per model.

mod cli;
mod config;
mod core;
mod logging;
mod management;
mod render;
mod updater;

use clap::Parser;
use cli::{exit_codes, Cli, Commands};

use crate::core::QuotaError;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    let color = cli::use_color(cli.no_color);
    let source = cli.config_source();
    let quota_args = cli.to_quota_args();

    let result = match cli.command {
        Some(Commands::Version) => {
            cli::print_version();
            Ok(())
        }
        Some(Commands::Update) => rt.block_on(cli::update::run()),
        Some(Commands::Config(args)) => rt.block_on(cli::config::run(args, source, color)),
        None => rt.block_on(cli::quota::run(quota_args)),
    };

    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if color {
                eprintln!("\x1b[1;31mError: {}\x1b[0m", e);
            } else {
                eprintln!("Error: {}", e);
            }
            categorize_error(&e)
        }
    }
}

/// Categorize an error into the appropriate exit code
fn categorize_error(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<QuotaError>() {
        Some(QuotaError::Config(_)) => exit_codes::CONFIG_ERROR,
        Some(QuotaError::Connection(_)) => exit_codes::CONNECTION_ERROR,
        Some(QuotaError::Upstream { .. }) => exit_codes::UPSTREAM_ERROR,
        Some(QuotaError::Parse(_)) => exit_codes::PARSE_ERROR,
        None => exit_codes::UNEXPECTED_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        let config: anyhow::Error = QuotaError::Config("missing".to_string()).into();
        assert_eq!(categorize_error(&config), exit_codes::CONFIG_ERROR);

        let conn: anyhow::Error = QuotaError::Connection("refused".to_string()).into();
        assert_eq!(categorize_error(&conn), exit_codes::CONNECTION_ERROR);

        let upstream: anyhow::Error = QuotaError::Upstream { status: 502 }.into();
        assert_eq!(categorize_error(&upstream), exit_codes::UPSTREAM_ERROR);

        let parse: anyhow::Error = QuotaError::Parse("bad".to_string()).into();
        assert_eq!(categorize_error(&parse), exit_codes::PARSE_ERROR);

        let other = anyhow::anyhow!("disk full");
        assert_eq!(categorize_error(&other), exit_codes::UNEXPECTED_FAILURE);
    }
}
