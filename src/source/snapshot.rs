use super::{SessionQuery, SessionSource, get_json, http_client};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// A pre-fetched JSON snapshot of the schedule, published as a static file.
pub enum SnapshotSource {
    File(PathBuf),
    Http { client: Client, url: String },
}

impl SnapshotSource {
    /// `location` is an http(s) URL or a filesystem path.
    pub fn new(location: &str, timeout: Duration) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Self::Http {
                client: http_client(timeout)?,
                url: location.to_string(),
            })
        } else {
            Ok(Self::File(PathBuf::from(location)))
        }
    }
}

impl SessionSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn fetch(&self, query: &SessionQuery) -> Result<Value> {
        // Snapshots are produced for one court/year upstream; the query does not apply.
        debug!(
            crtid = %query.crtid,
            crmyy = %query.crmyy,
            "Snapshot source ignores query"
        );

        match self {
            Self::File(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))
            }
            Self::Http { client, url } => get_json(self.name(), client.get(url)),
        }
    }
}
