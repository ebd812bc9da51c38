//! Build script for QuotaSense
//!
//! Stamps the binary with the git revision and build date so `qs version`
//! can report exactly what was installed.

use std::process::Command;

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

fn main() {
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo:rustc-env=QS_GIT_COMMIT={}", revision);
    println!("cargo:rustc-env=QS_BUILD_DATE={}", build_date);

    println!("cargo:rerun-if-changed=.git/HEAD");
    let Ok(head) = std::fs::read_to_string(".git/HEAD") else {
        return;
    };
    if let Some(branch_ref) = head.trim().strip_prefix("ref: ") {
        println!("cargo:rerun-if-changed=.git/{}", branch_ref.trim());
    }
}
