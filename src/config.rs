use anyhow::{Context, Result};
use std::{fs, path::Path, time::Duration};

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Values found in a `KEY=value` env file. Every field is optional because the
/// process environment and the built-in defaults fill the gaps.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Everything the YouTube client needs, handed to it at construction.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub host: String,
    pub port: u16,
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = unquote(value_raw.trim());
            match key.trim() {
                "YOUTUBE_API_KEY" => cfg.api_key = non_empty(value),
                "YOUTUBE_API_BASE" => cfg.api_base = non_empty(value),
                "HOST" => cfg.host = non_empty(value),
                "PORT" => {
                    let port: u16 = value
                        .parse()
                        .with_context(|| format!("Parsing PORT from {}", path.display()))?;
                    cfg.port = Some(port);
                }
                "HTTP_TIMEOUT_SECS" => {
                    let secs: u64 = value.parse().with_context(|| {
                        format!("Parsing HTTP_TIMEOUT_SECS from {}", path.display())
                    })?;
                    cfg.timeout_secs = Some(secs);
                }
                _ => {}
            }
        }
    }
    Ok(Some(cfg))
}

/// Loads settings from `path` with the process environment taking priority.
pub fn load_settings_from(path: impl AsRef<Path>) -> Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_settings_from`] but reads overrides through `lookup`, so the
/// precedence rules can be exercised without touching the real environment.
pub fn load_settings_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    let file = read_env_config(path)?.unwrap_or_default();
    let var = |key: &str| lookup(key).and_then(|value| non_empty(value.trim()));

    let api_key = var("YOUTUBE_API_KEY").or(file.api_key);
    let base_url = var("YOUTUBE_API_BASE")
        .or(file.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let host = var("HOST")
        .or(file.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match var("PORT") {
        Some(value) => value
            .parse::<u16>()
            .with_context(|| format!("Parsing PORT from the environment: {value:?}"))?,
        None => file.port.unwrap_or(DEFAULT_PORT),
    };
    let timeout_secs = match var("HTTP_TIMEOUT_SECS") {
        Some(value) => value.parse::<u64>().with_context(|| {
            format!("Parsing HTTP_TIMEOUT_SECS from the environment: {value:?}")
        })?,
        None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(Settings {
        api: ApiConfig {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        },
        host,
        port,
    })
}

/// Strips one pair of matching surrounding quotes, nothing more.
fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(value)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
