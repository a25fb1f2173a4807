// Startup configuration, read once from the environment (and `.env`)
use reqwest::Url;
use std::env;
use std::path::PathBuf;

use crate::app::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const API_URL_VAR: &str = "TODO_API_URL";
pub const LOG_DIR_VAR: &str = "TODO_LOG_DIR";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        load_dotenv(dotenvy::dotenv())?;
        Config::from_lookup(|key| env::var(key).ok())
    }

    // Build the config from any key lookup; unset or blank values use the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = normalize_api_url(&value(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.into()))?;
        let log_dir = value(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Config { api_url, log_dir })
    }
}

// A missing .env file is the normal case; an unreadable or malformed one is not
fn load_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: String| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        assert_eq!(
            config_from(&[]).unwrap(),
            Config {
                api_url: "http://localhost:5001".into(),
                log_dir: PathBuf::from("."),
            }
        );
    }

    #[test]
    fn override_replaces_origin_and_trims_trailing_slash() {
        let config = config_from(&[
            (API_URL_VAR, "http://mcp-todo-backend:5000/"),
            (LOG_DIR_VAR, "/tmp/todo"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://mcp-todo-backend:5000");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/todo"));
    }

    #[test]
    fn blank_override_uses_default() {
        let config = config_from(&[(API_URL_VAR, "   ")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_non_http_origin() {
        assert!(matches!(
            config_from(&[(API_URL_VAR, "ftp://example.com")]),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(config_from(&[(API_URL_VAR, "not a url")]).is_err());
    }

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, ".env"));
        assert!(load_dotenv(Err(missing)).is_ok());
        assert!(load_dotenv(Ok(PathBuf::from(".env"))).is_ok());
    }

    #[test]
    fn malformed_dotenv_file_is_reported() {
        let malformed = dotenvy::Error::LineParse("TODO_API_URL http://x".into(), 13);
        assert!(matches!(load_dotenv(Err(malformed)), Err(ConfigError::DotEnv(_))));

        let unreadable = dotenvy::Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            ".env",
        ));
        assert!(matches!(load_dotenv(Err(unreadable)), Err(ConfigError::DotEnv(_))));
    }
}
