use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use hyper::StatusCode;

use super::json_response;
use crate::global::Global;
use crate::http::error::ApiError;
use crate::sources::{GameSearch, SearchParams, SearchQuery};

pub fn routes() -> Router<Arc<Global>> {
    Router::new()
        .route("/nsg-reviews", get(nsg_reviews))
        .route("/nsg-reviews-status", get(nsg_reviews_status))
}

/// GET /nsg-reviews?title=
#[tracing::instrument(skip(global))]
async fn nsg_reviews(
    State(global): State<Arc<Global>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = SearchQuery::try_from(params)?;
    let body = global.reviews.search(&query).await?;

    Ok(json_response(body))
}

/// Only 200 and 503 are passed through; anything else is reported as 500.
pub(crate) fn probe_status(upstream: StatusCode) -> StatusCode {
    match upstream {
        StatusCode::OK | StatusCode::SERVICE_UNAVAILABLE => upstream,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /nsg-reviews-status
#[tracing::instrument(skip(global))]
async fn nsg_reviews_status(State(global): State<Arc<Global>>) -> StatusCode {
    match global.reviews.status().await {
        Ok(upstream) => {
            tracing::debug!(status = upstream.as_u16(), "reviews service probed");
            probe_status(upstream)
        }
        Err(e) => {
            tracing::error!(error = %e, "reviews service unreachable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
