use anyhow::{bail, Context};
use tokio::process::Command;

use crate::core::formatting::{parse_git_log, Commit};

/// The `count` most recent commits of the repository the bot runs from.
pub async fn latest_commits(count: usize) -> anyhow::Result<Vec<Commit>> {
    let output = Command::new("git")
        .arg("log")
        .arg("-n")
        .arg(count.to_string())
        .arg("--format=%H%x1f%s")
        .output()
        .await
        .context("failed to run git")?;

    if !output.status.success() {
        bail!(
            "git log exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_git_log(&String::from_utf8_lossy(&output.stdout)))
}
