use std::path::Path;

use crate::error::{ffmpeg_error, ChapcutError, Result};
use log::info;
use tokio::process::Command;

/// Check that ffmpeg and ffprobe can be run
pub async fn validate_dependencies(ffmpeg: &Path, ffprobe: &Path) -> Result<()> {
    info!("Validating system dependencies...");

    check_tool("FFmpeg", ffmpeg).await?;
    check_tool("FFprobe", ffprobe).await?;

    info!("All dependencies validated successfully");
    Ok(())
}

/// Run `<program> -version` and log the first line
async fn check_tool(name: &str, program: &Path) -> Result<()> {
    let output = Command::new(program)
        .args(["-version"])
        .output()
        .await
        .map_err(|_| ChapcutError::MissingDependency {
            name: name.to_string(),
            suggestion: format!(
                "Install FFmpeg (https://ffmpeg.org/download.html) or point {} at it in the config file",
                config_key(name)
            ),
        })?;

    if !output.status.success() {
        return Err(ffmpeg_error(
            format!("{} is installed but not working properly", program.display()),
            Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
        ));
    }

    let version_info = String::from_utf8_lossy(&output.stdout);
    if let Some(version_line) = version_info.lines().next() {
        info!("{} found: {}", name, version_line);
    }

    Ok(())
}

fn config_key(name: &str) -> &'static str {
    if name == "FFprobe" {
        "ffprobe_path"
    } else {
        "ffmpeg_path"
    }
}
