use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::fmt;

/// Left in freshly generated configs until the proxy has been deployed.
const PROXY_URL_PLACEHOLDER: &str = "PASTE_YOUR_WORKER_URL_HERE";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Proxy,
    Direct,
    Snapshot,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Proxy => write!(f, "proxy"),
            SourceKind::Direct => write!(f, "direct"),
            SourceKind::Snapshot => write!(f, "snapshot"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    pub proxy_url: Option<String>,
    pub direct_url: Option<String>,

    /// Filesystem path or http(s) URL of a JSON snapshot.
    pub snapshot: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            proxy_url: None,
            direct_url: None,
            snapshot: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Defaults for the court id and case year when none are given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub crtid: String,

    #[serde(default)]
    pub crmyy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_port() -> u16 {
    8080
}

/// Load configuration from config.toml and environment variables
pub fn load() -> Result<Config> {
    figment()
        .extract()
        .context("Failed to load configuration")
}

fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file("config.toml"))
        // Use double-underscore nesting for snake_case keys
        .merge(Env::prefixed("COURTSCHED_").split("__"))
}

/// Validate configuration and return a user-friendly error
pub fn validate(config: &Config) -> Result<(), String> {
    let source = &config.source;

    match source.kind {
        SourceKind::Proxy => {
            let url = source
                .proxy_url
                .as_deref()
                .ok_or("source.proxy_url is required when source.kind = \"proxy\"")?;
            if url.contains(PROXY_URL_PLACEHOLDER) {
                return Err("Set source.proxy_url first".into());
            }
            check_http_url("source.proxy_url", url)?;
        }
        SourceKind::Direct => {
            let url = source
                .direct_url
                .as_deref()
                .ok_or("source.direct_url is required when source.kind = \"direct\"")?;
            check_http_url("source.direct_url", url)?;
        }
        SourceKind::Snapshot => {
            let location = source
                .snapshot
                .as_deref()
                .ok_or("source.snapshot is required when source.kind = \"snapshot\"")?;
            if location.trim().is_empty() {
                return Err("source.snapshot must not be empty".into());
            }
        }
    }

    if source.timeout_seconds == 0 {
        return Err("source.timeout_seconds must be greater than 0".into());
    }

    if config.web.port == 0 {
        return Err("web.port must be greater than 0".into());
    }

    Ok(())
}

fn check_http_url(key: &str, url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("{key} must be an http:// or https:// URL"))
    }
}

/// A view of SourceConfig showing only the settings the selected kind uses
#[derive(Debug)]
#[allow(dead_code)]
pub struct SanitizedSourceConfig {
    pub kind: SourceKind,
    pub location: String,
    pub timeout_seconds: u64,
}

impl SourceConfig {
    pub fn sanitized_for_log(&self) -> SanitizedSourceConfig {
        let location = match self.kind {
            SourceKind::Proxy => self.proxy_url.as_deref(),
            SourceKind::Direct => self.direct_url.as_deref(),
            SourceKind::Snapshot => self.snapshot.as_deref(),
        };

        SanitizedSourceConfig {
            kind: self.kind,
            // Strip any query string; deployed proxies sometimes carry keys there.
            location: location
                .map(|l| l.split('?').next().unwrap_or(l).to_string())
                .unwrap_or_else(|| "<not set>".into()),
            timeout_seconds: self.timeout_seconds,
        }
    }
}
