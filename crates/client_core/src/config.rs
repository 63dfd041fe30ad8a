use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const APP_DIR_NAME: &str = "glow_up";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub default_plan_weeks: u32,
    pub default_progress_days: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            data_dir: default_data_dir(),
            request_timeout_secs: 30,
            default_plan_weeks: 4,
            default_progress_days: 30,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    default_plan_weeks: Option<u32>,
    default_progress_days: Option<u32>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")))
}

/// Defaults, then the TOML file (when present), then environment overrides.
///
/// An explicit `path` must exist; the implicit `client.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let (config_path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&config_path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw).with_context(|| {
                format!("failed to parse client config '{}'", config_path.display())
            })?;
            apply_file_settings(&mut settings, file_cfg);
        }
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read client config '{}'", config_path.display())
            })
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.data_dir {
        settings.data_dir = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.default_plan_weeks {
        settings.default_plan_weeks = v;
    }
    if let Some(v) = file_cfg.default_progress_days {
        settings.default_progress_days = v;
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GLOWUP_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("GLOWUP_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("APP__DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

/// Trims whitespace and trailing slashes so paths can be appended verbatim.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(anyhow!("api base url must not be empty"));
    }
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid api base url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "api base url '{trimmed}' must use http or https, got '{}'",
            parsed.scheme()
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
