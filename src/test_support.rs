//! In-process axum server for exercising the blocking clients in tests.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tokio::runtime::Runtime;

pub const SPARQL_RESULTS: &str = "application/sparql-results+json";

/// Keeps the runtime serving `app` alive for as long as the value lives.
pub struct TestServer {
    _runtime: Runtime,
    base: String,
}

impl TestServer {
    pub fn start(app: Router) -> Self {
        let runtime = Runtime::new().expect("runtime should start");
        let addr = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("listener should bind");
            let addr = listener.local_addr().expect("listener should have an address");
            tokio::spawn(async move { axum::serve(listener, app).await.expect("serve") });
            addr
        });
        Self {
            _runtime: runtime,
            base: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

pub fn sparql_json(body: String) -> Response {
    ([(header::CONTENT_TYPE, SPARQL_RESULTS)], body).into_response()
}

/// Fixed routes for URL classification: `/ok`, `/missing`, `/stall`, `/loop`.
pub fn link_routes() -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route(
            "/stall",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        )
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
}
