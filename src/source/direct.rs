use super::{SessionQuery, SessionSource, get_json, http_client};
use anyhow::Result;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Queries the judicial schedule API directly, without a proxy in between.
pub struct DirectSource {
    client: Client,
    url: String,
}

impl DirectSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
        })
    }
}

impl SessionSource for DirectSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn fetch(&self, query: &SessionQuery) -> Result<Value> {
        debug!(
            url = %self.url,
            crtid = %query.crtid,
            crmyy = %query.crmyy,
            "Fetching sessions from upstream API"
        );

        let request = self.client.get(&self.url).query(&[
            ("crtid", query.crtid.as_str()),
            ("crmyy", query.crmyy.as_str()),
        ]);

        get_json(self.name(), request)
    }
}
