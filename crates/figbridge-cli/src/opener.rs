//! Hand a URL to the operating system's default handler.

use figbridge_core::{Error, Result};
use tokio::process::Command;
use tracing::debug;

fn opener_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    }
}

pub async fn open_url(url: &str) -> Result<()> {
    let mut command = opener_command(url);
    debug!("Opening URL with {:?}", command.as_std().get_program());
    let status = command
        .status()
        .await
        .map_err(|e| Error::Launch(format!("failed to run opener: {}", e)))?;
    if !status.success() {
        return Err(Error::Launch(format!("opener exited with {}", status)));
    }
    Ok(())
}
