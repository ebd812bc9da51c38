//! Release checker for QuotaSense
//! Looks up the latest GitHub release and the archive built for this platform

use serde::Deserialize;
use std::time::Duration;

const GITHUB_REPO: &str = "quaywin/quota-sense-cli";
const ASSET_PREFIX: &str = "quota-sense-cli";
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct UpdateInfo {
    pub version: String,
    pub release_url: String,
    /// Archive for this OS/arch, if the release ships one
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    html_url: String,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// Fetch the latest release; `Ok(None)` when already up to date
pub async fn check_for_updates() -> anyhow::Result<Option<UpdateInfo>> {
    let url = format!("https://api.github.com/repos/{}/releases/latest", GITHUB_REPO);

    let client = reqwest::Client::builder()
        .user_agent("quota-sense")
        .timeout(Duration::from_secs(15))
        .build()?;

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("GitHub API returned status {}", response.status().as_u16());
    }
    let release: GitHubRelease = response.json().await?;

    let remote_version = release.tag_name.trim_start_matches('v');
    if !is_newer_version(remote_version, CURRENT_VERSION) {
        tracing::debug!(remote = %release.tag_name, "Already on the latest release");
        return Ok(None);
    }

    let pattern = asset_pattern(std::env::consts::OS, std::env::consts::ARCH);
    let extension = archive_extension(std::env::consts::OS);
    let download_url = release
        .assets
        .iter()
        .find(|a| a.name.contains(&pattern) && a.name.ends_with(extension))
        .map(|a| a.browser_download_url.clone());

    Ok(Some(UpdateInfo {
        version: release.tag_name,
        release_url: release.html_url,
        download_url,
    }))
}

/// Release asset stem, using Go-style platform names (`darwin_arm64`, ...)
fn asset_pattern(os: &str, arch: &str) -> String {
    let os = match os {
        "macos" => "darwin",
        other => other,
    };
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    format!("{}_{}_{}", ASSET_PREFIX, os, arch)
}

fn archive_extension(os: &str) -> &'static str {
    if os == "windows" {
        "zip"
    } else {
        "tar.gz"
    }
}

/// Compare semantic versions, returns true if remote is newer
fn is_newer_version(remote: &str, current: &str) -> bool {
    let parse_version = |v: &str| -> (u32, u32, u32) {
        let parts: Vec<u32> = v
            .split(|c: char| c == '.' || c == '-')
            .filter_map(|p| p.parse().ok())
            .collect();
        (
            parts.first().copied().unwrap_or(0),
            parts.get(1).copied().unwrap_or(0),
            parts.get(2).copied().unwrap_or(0),
        )
    };

    parse_version(remote) > parse_version(current)
}

/// Get the current version
pub fn current_version() -> &'static str {
    CURRENT_VERSION
}
