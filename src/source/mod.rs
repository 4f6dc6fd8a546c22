pub mod direct;
pub mod proxy;
pub mod snapshot;

use crate::config::{SourceConfig, SourceKind};
use crate::render::{RenderedTable, render_payload};
use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Something that can produce the raw schedule feed for a query.
pub trait SessionSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch and parse the feed document. Fails only on transport problems:
    /// connection errors, non-2xx responses or bodies that are not JSON.
    fn fetch(&self, query: &SessionQuery) -> Result<Value>;
}

/// Court id and ROC case year to look up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub crtid: String,
    pub crmyy: String,
}

impl SessionQuery {
    pub fn new(crtid: &str, crmyy: &str) -> Self {
        Self {
            crtid: crtid.trim().to_string(),
            crmyy: crmyy.trim().to_string(),
        }
    }
}

/// Build the source selected in the configuration.
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn SessionSource>> {
    let timeout = Duration::from_secs(config.timeout_seconds);

    let source: Box<dyn SessionSource> = match config.kind {
        SourceKind::Proxy => {
            let url = config
                .proxy_url
                .as_deref()
                .context("source.proxy_url is not set")?;
            Box::new(proxy::ProxySource::new(url, timeout)?)
        }
        SourceKind::Direct => {
            let url = config
                .direct_url
                .as_deref()
                .context("source.direct_url is not set")?;
            Box::new(direct::DirectSource::new(url, timeout)?)
        }
        SourceKind::Snapshot => {
            let location = config
                .snapshot
                .as_deref()
                .context("source.snapshot is not set")?;
            Box::new(snapshot::SnapshotSource::new(location, timeout)?)
        }
    };

    info!(kind = %config.kind, source = source.name(), "Session source ready");
    Ok(source)
}

/// Fetch the feed for `query` and render it.
pub fn fetch_table(source: &dyn SessionSource, query: &SessionQuery) -> Result<RenderedTable> {
    let payload = source.fetch(query)?;
    let table = render_payload(&payload);

    info!(
        source = source.name(),
        crtid = %query.crtid,
        crmyy = %query.crmyy,
        items = table.count,
        "Sessions rendered"
    );

    Ok(table)
}

fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("courtsched/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Send a request and parse the body as JSON, turning non-2xx statuses into errors.
fn get_json(source: &str, request: RequestBuilder) -> Result<Value> {
    let start = Instant::now();
    let response = request
        .send()
        .with_context(|| format!("{source}: request failed"))?;
    let status = response.status();

    debug!(
        source,
        status = %status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Feed response received"
    );

    if !status.is_success() {
        bail!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
    }

    let body = response
        .text()
        .with_context(|| format!("{source}: failed to read response body"))?;

    serde_json::from_str(&body).with_context(|| format!("{source}: response is not valid JSON"))
}
