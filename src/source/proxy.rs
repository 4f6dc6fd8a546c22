use super::{SessionQuery, SessionSource, get_json, http_client};
use anyhow::Result;
use chrono::Utc;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fetches the feed through a deployed CORS proxy (e.g. a Cloudflare Worker)
/// that forwards the query to the judicial API.
pub struct ProxySource {
    client: Client,
    url: String,
}

impl ProxySource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
        })
    }
}

impl SessionSource for ProxySource {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn fetch(&self, query: &SessionQuery) -> Result<Value> {
        // `t` keeps intermediate caches from serving a stale schedule.
        let cache_buster = Utc::now().timestamp_millis().to_string();

        debug!(
            url = %self.url,
            crtid = %query.crtid,
            crmyy = %query.crmyy,
            "Fetching sessions via proxy"
        );

        let request = self.client.get(&self.url).query(&[
            ("crtid", query.crtid.as_str()),
            ("crmyy", query.crmyy.as_str()),
            ("t", cache_buster.as_str()),
        ]);

        get_json(self.name(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn fetch(uri: String, query: SessionQuery) -> Result<Value> {
        tokio::task::spawn_blocking(move || {
            ProxySource::new(&uri, Duration::from_secs(5))?.fetch(&query)
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_query_and_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("crtid", "TPD"))
            .and(query_param("crmyy", "114"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "dudt": "1141223", "dutm": "1030" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let value = fetch(server.uri(), SessionQuery::new(" TPD ", "114")).await.unwrap();

        assert_eq!(value["data"][0]["dudt"], "1141223");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_numeric_cache_buster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        fetch(server.uri(), SessionQuery::default()).await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let t = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "t")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(t.parse::<i64>().unwrap() > 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn encodes_query_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("crtid", "臺北&x=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        fetch(server.uri(), SessionQuery::new("臺北&x=1", "")).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), SessionQuery::default()).await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_json_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetch(server.uri(), SessionQuery::default()).await.unwrap_err();

        assert!(err.to_string().contains("not valid JSON"));
    }
}
