use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::json_response;
use crate::error::ServiceError;
use crate::global::Global;
use crate::http::error::ApiError;
use crate::scraper::metacritic::GameSummary;
use crate::sources::{GameSearch, SearchParams, SearchQuery};

pub fn routes() -> Router<Arc<Global>> {
    Router::new()
        .route("/how-long-to-beat", get(how_long_to_beat))
        .route("/metacritic", get(metacritic))
        .route("/search-game", get(search_game))
}

/// GET /how-long-to-beat?title=&year=
///
/// Returns the HowLongToBeat search response exactly as received.
#[tracing::instrument(skip(global))]
async fn how_long_to_beat(
    State(global): State<Arc<Global>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = SearchQuery::try_from(params)?;
    let body = global.hltb.search(&query).await?;

    Ok(json_response(body))
}

/// GET /metacritic?title=&type=&platform=&exact=
#[tracing::instrument(skip(global))]
async fn metacritic(
    State(global): State<Arc<Global>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let query = SearchQuery::try_from(params)?;
    let games = global.metacritic.search(&query).await?;

    Ok(Json(games))
}

/// GET /search-game?title=
///
/// Nintendo product search restricted to games; 404 when nothing matches.
#[tracing::instrument(skip(global))]
async fn search_game(
    State(global): State<Arc<Global>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let query = SearchQuery::try_from(params)?;
    let games = global.nintendo.search(&query).await?;

    if games.is_empty() {
        return Err(ServiceError::NotFound("no games found").into());
    }

    Ok(Json(games))
}
