use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default docflow data directory: ~/.docflow
pub fn get_docflow_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".docflow"))
}

/// Loads an explicit config file, then applies environment overrides.
pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
    let mut cfg = toml::from_str::<AppConfig>(&s)?;
    finish(&mut cfg)?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.docflow/config.toml (highest)
    let data_dir = get_docflow_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    finish(&mut cfg)?;
    Ok(cfg)
}

fn finish(cfg: &mut AppConfig) -> anyhow::Result<()> {
    if cfg
        .storage
        .path
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        let state_file = get_docflow_data_dir()?.join("state.json");
        cfg.storage.path = Some(state_file.to_string_lossy().to_string());
    }

    apply_env_overrides(cfg, |key| std::env::var(key).ok());
    Ok(())
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DOCFLOW_SERVER_URL").filter(|v| !v.trim().is_empty()) {
        cfg.server.base_url = v;
    }
    if let Some(v) = var("DOCFLOW_POLL_INTERVAL_MS") {
        match v.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => cfg.polling.interval_ms = ms,
            _ => tracing::warn!(value = %v, "ignoring invalid DOCFLOW_POLL_INTERVAL_MS"),
        }
    }
    if let Some(v) = var("DOCFLOW_STATE_PATH").filter(|v| !v.trim().is_empty()) {
        cfg.storage.path = Some(v);
    }
}
