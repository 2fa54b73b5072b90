use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::backlog::{self, BacklogEntry};
use crate::global::Global;
use crate::http::error::ApiError;

pub fn routes() -> Router<Arc<Global>> {
    Router::new().route("/random", get(random))
}

/// GET /random
///
/// One uniformly chosen unfinished backlog game, with its `documentId`.
#[tracing::instrument(skip(global))]
async fn random(State(global): State<Arc<Global>>) -> Result<Json<BacklogEntry>, ApiError> {
    let entry = backlog::random_game(global.backlog.as_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "failed to pick a backlog game");
        ApiError::from(e)
    })?;

    Ok(Json(entry))
}
