use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ratatui::style::Color;

use crate::cache::ItemCache;
use crate::config::{self, Config, KeywordConfig};
use crate::data::ItemSource;
use crate::hackernews;
use crate::logger;
use crate::render::{Highlighter, Keyword};
use crate::ui;

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub user: Option<String>,
    pub config_file: Option<PathBuf>,
}

pub fn run(opts: RunOptions) -> Result<()> {
    let mut cfg = config::load(config::LoadOptions {
        config_file: opts.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    if let Some(user) = opts.user.filter(|user| !user.trim().is_empty()) {
        cfg.hackernews.user = user;
    }

    let log_path = logger::init(&cfg.log)?;
    log::info!(
        "config from {}, logging to {}",
        friendly_path(opts.config_file.or_else(config::default_path).as_ref()),
        log_path.display()
    );

    let client = hackernews::Client::new(hackernews::ClientConfig {
        user_agent: cfg.hackernews.user_agent.clone(),
        base_url: cfg.hackernews.base_url.clone(),
        timeout: cfg.hackernews.timeout,
        http_client: None,
    })
    .context("build hackernews client")?;
    let source: Arc<dyn ItemSource> = Arc::new(client);

    let cache = ItemCache::for_user(source, &cfg.hackernews.user)
        .with_context(|| format!("load submissions of {}", cfg.hackernews.user))?;
    let highlighter = build_highlighter(&cfg)?;

    let cache = Arc::new(cache);

    ui::run(ui::Options {
        cache: cache.clone(),
        highlighter,
    })?;

    let stats = cache.stats();
    log::info!(
        "session closed: {} items known, {} fetched, {} failed",
        stats.known,
        stats.fetched,
        stats.failed
    );
    Ok(())
}

fn build_highlighter(cfg: &Config) -> Result<Highlighter> {
    Highlighter::with_extra(&configured_keywords(&cfg.ui.keywords)).context("build highlighter")
}

/// Keywords from the config whose colors parse; the rest are logged and skipped.
pub fn configured_keywords(raw: &[KeywordConfig]) -> Vec<Keyword> {
    raw.iter()
        .filter_map(|entry| {
            if entry.phrase.trim().is_empty() {
                return None;
            }
            match entry.color.parse::<Color>() {
                Ok(color) => Some(Keyword::new(entry.phrase.trim(), color)),
                Err(_) => {
                    log::warn!(
                        "skipping keyword {:?}: unknown color {:?}",
                        entry.phrase,
                        entry.color
                    );
                    None
                }
            }
        })
        .collect()
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/hn-hiring/config.yaml".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(phrase: &str, color: &str) -> KeywordConfig {
        KeywordConfig {
            phrase: phrase.into(),
            color: color.into(),
        }
    }

    #[test]
    fn keywords_with_unknown_colors_are_skipped() {
        let keywords = configured_keywords(&[
            entry("rust", "red"),
            entry("golang", "not-a-color"),
            entry("  ", "blue"),
            entry("elixir", "#ff6600"),
        ]);
        assert_eq!(
            keywords,
            vec![
                Keyword::new("rust", Color::Red),
                Keyword::new("elixir", Color::Rgb(255, 102, 0)),
            ]
        );
    }

    #[test]
    fn configured_keywords_extend_the_defaults() {
        let mut cfg = Config::default();
        cfg.ui.keywords.push(entry("rust", "red"));
        let highlighter = build_highlighter(&cfg).unwrap();
        let mask = highlighter.mask("Rust, remote");
        assert_eq!(mask[0], Some(Color::Red));
        assert_eq!(mask[6], Some(Color::Green));
    }

    #[test]
    fn friendly_path_falls_back_to_default_location() {
        assert_eq!(friendly_path(None), "~/.config/hn-hiring/config.yaml");
        assert_eq!(
            friendly_path(Some(&PathBuf::from("/etc/hn-hiring.yaml"))),
            "/etc/hn-hiring.yaml"
        );
    }
}
