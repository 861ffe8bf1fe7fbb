use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::info;

pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_TARGET: &str = "https://hris.marusysvina.com:8080";
pub const DEFAULT_PREFIX: &str = "/api";
pub const DEFAULT_REWRITE: &str = "/v1";
pub const DEFAULT_STATIC_DIR: &str = "dist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub port: u16,
    /// Upstream origin, e.g. `https://host:8080`, without a trailing slash.
    pub target: String,
    /// Local path prefix that is forwarded.
    pub prefix: String,
    /// Replacement for `prefix` on the upstream side.
    pub rewrite: String,
    pub static_dir: PathBuf,
    /// Skip upstream certificate verification.
    pub insecure_tls: bool,
}

impl ProxyConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let load = |key: &str, default: &str| {
            var(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        Ok(Self {
            port: parse("PORT", &load("PORT", DEFAULT_PORT))?,
            target: load("PROXY_TARGET", DEFAULT_TARGET)
                .trim_end_matches('/')
                .to_string(),
            prefix: normalize_prefix(&load("PROXY_PREFIX", DEFAULT_PREFIX)),
            rewrite: normalize_prefix(&load("PROXY_REWRITE", DEFAULT_REWRITE)),
            static_dir: PathBuf::from(load("STATIC_DIR", DEFAULT_STATIC_DIR)),
            insecure_tls: parse_bool("PROXY_INSECURE_TLS", &load("PROXY_INSECURE_TLS", "true"))?,
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value '{value}': {e}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(anyhow!("Invalid {key} value '{value}': expected true or false")),
    }
}

/// Leading slash, no trailing slash; `/` becomes the empty string.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.target, "https://hris.marusysvina.com:8080");
        assert_eq!(config.prefix, "/api");
        assert_eq!(config.rewrite, "/v1");
        assert_eq!(config.static_dir, PathBuf::from("dist"));
        assert!(config.insecure_tls);
    }

    #[test]
    fn test_overrides_are_normalized() {
        let config = ProxyConfig::from_lookup(|key| match key {
            "PORT" => Some("8081".into()),
            "PROXY_TARGET" => Some("http://localhost:9000/".into()),
            "PROXY_PREFIX" => Some("backend/".into()),
            "PROXY_REWRITE" => Some("/".into()),
            "PROXY_INSECURE_TLS" => Some("false".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.target, "http://localhost:9000");
        assert_eq!(config.prefix, "/backend");
        assert_eq!(config.rewrite, "");
        assert!(!config.insecure_tls);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(ProxyConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_string())).is_err());
        assert!(ProxyConfig::from_lookup(|k| (k == "PROXY_INSECURE_TLS").then(|| "maybe".to_string())).is_err());
    }
}
