//! Persistent connection settings for the management server
//!
//! Stored as JSON in `~/.quota-sense.json`:
//! - `server_url`: base URL of the management server
//! - `management_token`: bearer secret for `/v0/management`

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::core::QuotaError;

const CONFIG_FILE_NAME: &str = ".quota-sense.json";

/// Connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub management_token: String,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Config path, honouring an explicit override
    pub fn resolve_path(override_path: Option<&Path>) -> Result<PathBuf, QuotaError> {
        match override_path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path()
                .ok_or_else(|| QuotaError::Config("could not determine home directory".to_string())),
        }
    }

    /// Load and validate the config file
    pub fn load_from(path: &Path) -> Result<Self, QuotaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuotaError::Config(format!("could not read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| QuotaError::Config(format!("{}: {}", path.display(), e)))?;
        config.validated()
    }

    /// Write the config with owner-only permissions
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Replace stored values with non-empty overrides (from flags or env)
    pub fn with_overrides(mut self, server_url: Option<String>, management_token: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|s| !s.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(token) = management_token.filter(|s| !s.trim().is_empty()) {
            self.management_token = token;
        }
        self
    }

    /// Trim, check both values are present and that the URL is http(s)
    pub fn validated(self) -> Result<Self, QuotaError> {
        let server_url = self.server_url.trim().trim_end_matches('/').to_string();
        let management_token = self.management_token.trim().to_string();

        if server_url.is_empty() || management_token.is_empty() {
            return Err(QuotaError::Config(
                "server URL and management token are required".to_string(),
            ));
        }

        let parsed = url::Url::parse(&server_url)
            .map_err(|e| QuotaError::Config(format!("invalid server URL '{}': {}", server_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(QuotaError::Config(format!(
                "server URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            server_url,
            management_token,
        })
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        let token = if self.management_token.len() > 4 {
            let tail: String = self
                .management_token
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", tail)
        } else {
            "****".to_string()
        };
        Self {
            server_url: self.server_url.clone(),
            management_token: token,
        }
    }
}

/// Interactively ask for the server URL and token
pub fn prompt_config<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<Config, QuotaError> {
    let mut ask = |label: &str| -> Result<String, QuotaError> {
        write!(output, "{}", label).and_then(|_| output.flush()).map_err(prompt_io)?;
        let mut line = String::new();
        input.read_line(&mut line).map_err(prompt_io)?;
        Ok(line.trim().to_string())
    };

    let server_url = ask("Enter Remote Server URL (e.g., http://localhost:8080): ")?;
    let management_token = ask("Enter Management Token (Secret Key): ")?;

    Config {
        server_url,
        management_token,
    }
    .validated()
}

fn prompt_io(err: std::io::Error) -> QuotaError {
    QuotaError::Config(format!("failed to read input: {}", err))
}
