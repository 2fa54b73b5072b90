use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::http::Method;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::global::Global;

pub mod error;
pub mod routes;


/// Every route is a public read-only GET, so any origin may call it.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .max_age(Duration::from_secs(7200))
}

pub fn app(global: Arc<Global>) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    routes::routes()
        .with_state(global)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(CompressionLayer::new())
                .layer(cors_layer()),
        )
}

async fn not_found() -> error::ApiError {
    error::ApiError::not_found(error::ApiErrorCode::RouteNotFound, "route not found")
}

#[tracing::instrument(name = "HTTP", skip_all)]
pub async fn run(global: Arc<Global>) -> anyhow::Result<()> {
    let bind = global.config.server.bind;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    let local = listener.local_addr().context("listener has no local address")?;
    tracing::info!(%local, "game info api listening");

    axum::serve(
        listener,
        app(global).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("http server error")
}
