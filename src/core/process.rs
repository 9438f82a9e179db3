use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for a single Azure CLI call; token refreshes can be slow.
pub const AZ_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the Azure CLI with `args` and return its trimmed stdout.
pub async fn run_az(args: &[&str]) -> Result<String> {
    let az = which("az").context("Azure CLI (`az`) not found in PATH")?;
    tracing::debug!(args = ?args, "running az");
    run_command(&az.to_string_lossy(), args, AZ_TIMEOUT).await
}

/// Run a command with arguments and a timeout, returning stdout as a String.
pub async fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new(cmd)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .with_context(|| format!("`{}` timed out after {}s", cmd, timeout.as_secs()))?
    .with_context(|| format!("Failed to execute `{}`", cmd))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("`{}` exited with {}: {}", cmd, output.status, stderr.trim());
    }

    let stdout =
        String::from_utf8(output.stdout).with_context(|| format!("Non-UTF8 output from `{}`", cmd))?;
    Ok(stdout.trim().to_string())
}

/// Check if a binary exists in PATH. Returns the full path if found.
pub fn which(binary: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|p| p.is_file())
    })
}
