//! Configuration management

use crate::error::{Result, YouDropError};
use crate::types::Config;
use crate::utils::paths::{default_download_dir, ensure_dir, get_config_dir, get_config_path};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Load configuration from file, merging with defaults
pub async fn load_config() -> Result<Config> {
    load_config_from(Path::new(&get_config_path())).await
}

/// Load configuration from an explicit path
pub async fn load_config_from(config_path: &Path) -> Result<Config> {
    let mut config = if config_path.exists() {
        let content = fs::read_to_string(config_path).await?;
        // Missing keys fall back to defaults via #[serde(default)]
        serde_json::from_str(&content)?
    } else {
        debug!(path = %config_path.display(), "no config file, using defaults");
        Config::default()
    };

    // Set download_dir with default if empty
    if config.download_dir.is_empty() {
        config.download_dir = default_download_dir().to_string_lossy().to_string();
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    for (name, pattern) in [
        ("progress_pattern", &config.progress_pattern),
        ("diagnostic_pattern", &config.diagnostic_pattern),
    ] {
        if let Some(pattern) = pattern {
            regex::Regex::new(pattern)
                .map_err(|e| YouDropError::InvalidConfig(format!("{}: {}", name, e)))?;
        }
    }
    Ok(())
}

/// Save configuration to file
pub async fn save_config(config: &Config) -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(get_config_path(), content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !Path::new(&config_path).exists() {
        save_config(&Config::default()).await?;
    }

    Command::new(editor)
        .arg(&config_path)
        .status()
        .await?;

    Ok(())
}
