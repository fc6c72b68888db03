use crate::policy::{ConversationMode, UnknownMode};
use std::env;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_STANDARD_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash-lite";

/// Defaults compiled into the binaries, used when no `.env` file exists.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PARLEY_DEFAULT_MODE: {0}")]
    DefaultMode(#[from] UnknownMode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub standard_model: String,
    pub search_model: String,
    pub fast_model: String,
    pub default_mode: ConversationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            standard_model: DEFAULT_STANDARD_MODEL.to_string(),
            search_model: DEFAULT_SEARCH_MODEL.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            default_mode: ConversationMode::Standard,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let default_mode = match get("PARLEY_DEFAULT_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.default_mode,
        };

        Ok(Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            standard_model: get("PARLEY_STANDARD_MODEL").unwrap_or(defaults.standard_model),
            search_model: get("PARLEY_SEARCH_MODEL").unwrap_or(defaults.search_model),
            fast_model: get("PARLEY_FAST_MODEL").unwrap_or(defaults.fast_model),
            default_mode,
        })
    }
}

/// Loads `.env` if present, otherwise the bundled defaults. Variables that
/// are already set are never overwritten.
///
/// Edits the process environment, so call it from `main` before any other
/// thread (including an async runtime) has started.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(_) => load_bundled_config(),
    }
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        if env::var(key).is_err() {
            // SAFETY: `load_dotenv` runs before any other thread exists
            unsafe {
                env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fast_model, "gemini-2.5-flash-lite");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("API_KEY", "fallback"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta"),
            ("PARLEY_FAST_MODEL", "gemini-flash-lite-latest"),
            ("PARLEY_DEFAULT_MODE", "search"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("fallback"));
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.fast_model, "gemini-flash-lite-latest");
        assert_eq!(config.default_mode, ConversationMode::SearchGrounded);
    }

    #[test]
    fn test_gemini_key_preferred_and_blank_ignored() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "fallback"),
            ("PARLEY_STANDARD_MODEL", "   "),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("primary"));
        assert_eq!(config.standard_model, DEFAULT_STANDARD_MODEL);
    }

    #[test]
    fn test_bad_mode() {
        let err = Config::from_lookup(lookup(&[("PARLEY_DEFAULT_MODE", "turbo")])).unwrap_err();
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn test_bundled_config_parses() {
        let pairs: Vec<_> = parse_env_lines("# comment\n\nA = 1\nB=two\nnot a pair\n").collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "two")]);
        assert!(parse_env_lines(BUNDLED_CONFIG).all(|(key, _)| !key.is_empty()));
    }
}
