//! Update command implementation

use crate::updater::{check_for_updates, current_version};

/// Run the update check
pub async fn run() -> anyhow::Result<()> {
    println!("Checking for updates...");

    let Some(update) = check_for_updates().await? else {
        println!("You are already on the latest version (v{})", current_version());
        return Ok(());
    };

    println!(
        "New version available: {} (current: v{})",
        update.version,
        current_version()
    );
    match update.download_url {
        Some(url) => println!("Download: {}", url),
        None => println!("No build for this platform was attached; see {}", update.release_url),
    }
    Ok(())
}
