use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hackernews::HN_API_BASE;

const DEFAULT_ENV_PREFIX: &str = "HN_HIRING";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HackerNewsConfig {
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            user_agent: default_user_agent(),
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_user() -> String {
    "whoishiring".to_string()
}

fn default_user_agent() -> String {
    format!("hn-hiring/{}", crate::VERSION)
}

fn default_base_url() -> String {
    HN_API_BASE.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UIConfig {
    /// Highlighted after the built-in keywords, in the order listed.
    #[serde(default)]
    pub keywords: Vec<KeywordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordConfig {
    pub phrase: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        // An explicitly requested file has to exist.
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = apply_env(cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.hackernews.user.trim().is_empty() {
        base.hackernews.user = other.hackernews.user;
    }
    if !other.hackernews.user_agent.trim().is_empty() {
        base.hackernews.user_agent = other.hackernews.user_agent;
    }
    if !other.hackernews.base_url.trim().is_empty() {
        base.hackernews.base_url = other.hackernews.base_url;
    }
    if !other.hackernews.timeout.is_zero() {
        base.hackernews.timeout = other.hackernews.timeout;
    }

    base.ui.keywords.extend(other.ui.keywords);

    if !other.log.level.trim().is_empty() {
        base.log.level = other.log.level;
    }
    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }

    base
}

fn apply_env(mut cfg: Config, prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    if value.trim().is_empty() {
        return;
    }
    match key {
        "hackernews.user" => cfg.hackernews.user = value,
        "hackernews.user_agent" => cfg.hackernews.user_agent = value,
        "hackernews.base_url" => cfg.hackernews.base_url = value,
        "hackernews.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.hackernews.timeout = duration;
            }
        }
        "log.level" => cfg.log.level = value,
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hn-hiring").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    fn isolated() -> LoadOptions {
        LoadOptions {
            config_file: None,
            env_prefix: Some("HN_HIRING_TEST_UNSET".into()),
        }
    }

    #[test]
    fn defaults_browse_whoishiring() {
        let cfg = Config::default();
        assert_eq!(cfg.hackernews.user, "whoishiring");
        assert_eq!(cfg.hackernews.base_url, HN_API_BASE);
        assert_eq!(cfg.hackernews.timeout, Duration::from_secs(20));
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.ui.keywords.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "hackernews:\n  user: pg\n  timeout: 5s\nui:\n  keywords:\n    - phrase: rust\n      color: \"#ff6600\"\n",
        )
        .unwrap();

        let cfg = load(LoadOptions {
            config_file: Some(path),
            ..isolated()
        })
        .unwrap();
        assert_eq!(cfg.hackernews.user, "pg");
        assert_eq!(cfg.hackernews.timeout, Duration::from_secs(5));
        assert_eq!(cfg.hackernews.user_agent, default_user_agent());
        assert_eq!(
            cfg.ui.keywords,
            vec![KeywordConfig {
                phrase: "rust".into(),
                color: "#ff6600".into(),
            }]
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = load(LoadOptions {
            config_file: Some(dir.path().join("absent.yaml")),
            ..isolated()
        });
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides() {
        env::set_var("HN_HIRING_ENVTEST_HACKERNEWS__USER", "dang");
        env::set_var("HN_HIRING_ENVTEST_HACKERNEWS__TIMEOUT", "2s");
        let cfg = load(LoadOptions {
            config_file: None,
            env_prefix: Some("HN_HIRING_ENVTEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.hackernews.user, "dang");
        assert_eq!(cfg.hackernews.timeout, Duration::from_secs(2));
        env::remove_var("HN_HIRING_ENVTEST_HACKERNEWS__USER");
        env::remove_var("HN_HIRING_ENVTEST_HACKERNEWS__TIMEOUT");
    }
}
