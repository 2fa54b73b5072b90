use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;

use crate::global::Global;

pub mod backlog;
pub mod games;
pub mod reviews;

/// Forwards an upstream JSON body byte-for-byte.
pub(super) fn json_response(bytes: Bytes) -> Response {
    ([(CONTENT_TYPE, "application/json")], bytes).into_response()
}

pub fn routes() -> Router<Arc<Global>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(games::routes())
        .merge(reviews::routes())
        .merge(backlog::routes())
}

async fn root() -> &'static str {
    "Game Information API"
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime: u64,
}

#[tracing::instrument(skip(global))]
async fn health(State(global): State<Arc<Global>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime: global.started_at.elapsed().as_secs(),
    })
}
