use anyhow::Context;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Runs `speedtest-cli --simple` and returns its trimmed standard output.
pub async fn run() -> anyhow::Result<String> {
    info!("Running speedtest");
    let output = Command::new("speedtest-cli")
        .arg("--simple")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("failed to start speedtest-cli")?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
