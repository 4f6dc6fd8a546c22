use crate::source::{SessionQuery, SessionSource, fetch_table};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../static/index.html");

type Source = Arc<dyn SessionSource>;

#[derive(Debug, Deserialize)]
struct TableParams {
    #[serde(default)]
    crtid: String,
    #[serde(default)]
    crmyy: String,
}

async fn index() -> Response {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], INDEX_HTML).into_response()
}

async fn api_table(State(source): State<Source>, Query(params): Query<TableParams>) -> Response {
    let query = SessionQuery::new(&params.crtid, &params.crmyy);

    // Sources use a blocking HTTP client.
    let result = tokio::task::spawn_blocking(move || fetch_table(source.as_ref(), &query)).await;

    match result {
        Ok(Ok(table)) => Json(table).into_response(),
        Ok(Err(err)) => {
            error!(error = %err, "Failed to fetch sessions");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("{err:#}") })),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "Session fetch task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn router(source: Source) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/table", get(api_table))
        .with_state(source)
}

/// Serve the schedule page until `running` is cleared.
pub fn start(source: Source, port: u16, running: Arc<AtomicBool>) -> Result<()> {
    let app = router(source);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime for web server")?;

    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("Web server failed to bind port {port}"))?;

        info!(port, "Web server listening");

        let shutdown = async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
            info!("Web server shutting down");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Web server error")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Records the last query and replies with a canned payload.
    struct Canned {
        payload: Option<Value>,
        seen: Mutex<Option<SessionQuery>>,
    }

    impl SessionSource for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn fetch(&self, query: &SessionQuery) -> Result<Value> {
            *self.seen.lock().unwrap() = Some(query.clone());
            match &self.payload {
                Some(payload) => Ok(payload.clone()),
                None => bail!("HTTP 502 Bad Gateway"),
            }
        }
    }

    fn canned(payload: Option<Value>) -> Arc<Canned> {
        Arc::new(Canned {
            payload,
            seen: Mutex::new(None),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn serves_index_page() {
        let (status, body) = get(router(canned(None)), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/api/table"));
    }

    #[tokio::test]
    async fn table_endpoint_renders_sessions() {
        let source = canned(Some(json!({
            "data": [{ "dudt": "1141223", "dutm": "1030", "dukd": "<b>審理</b>" }]
        })));

        let (status, body) = get(router(source.clone()), "/api/table?crtid=%20TPD&crmyy=114").await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["count"], 1);
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("2025-12-23 10:30 (ROC 114/12/23)"));
        assert!(html.contains("&lt;b&gt;審理&lt;/b&gt;"));
        assert_eq!(
            source.seen.lock().unwrap().clone(),
            Some(SessionQuery::new("TPD", "114"))
        );
    }

    #[tokio::test]
    async fn table_endpoint_without_params() {
        let source = canned(Some(json!({ "data": [] })));

        let (status, body) = get(router(source.clone()), "/api/table").await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["count"], 0);
        assert_eq!(body["html"], "<p>No data</p>");
        assert_eq!(source.seen.lock().unwrap().clone(), Some(SessionQuery::default()));
    }

    #[tokio::test]
    async fn transport_error_is_bad_gateway() {
        let (status, body) = get(router(canned(None)), "/api/table?crtid=TPD").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "HTTP 502 Bad Gateway");
    }
}
