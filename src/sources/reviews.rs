use async_trait::async_trait;
use bytes::Bytes;
use hyper::StatusCode;

use super::{join_url, json_body, send, GameSearch, SearchQuery};
use crate::error::{Result, ServiceError};

const SERVICE: &str = "reviews";

/// Client for the external reviews service.
#[derive(Debug, Clone)]
pub struct ReviewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReviewsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Liveness probe against the service root. Returns whatever status the
    /// service answered with; only transport failures are errors.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> Result<StatusCode> {
        let response = self
            .client
            .get(join_url(&self.base_url, "/"))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "reviews liveness probe failed");
                ServiceError::upstream(SERVICE, None)
            })?;

        // reqwest and axum share the `http` crate, so the status carries over as-is.
        Ok(response.status())
    }
}

#[async_trait]
impl GameSearch for ReviewsClient {
    type Output = Bytes;

    #[tracing::instrument(skip(self), fields(title = %query.title))]
    async fn search(&self, query: &SearchQuery) -> Result<Bytes> {
        let request = self.client.get(join_url(&self.base_url, "/list/query")).query(&[
            ("search", query.title.as_str()),
            ("sort", "release_date"),
            ("dir", "asc"),
            ("notuser", "true"),
        ]);

        json_body(SERVICE, send(SERVICE, request).await?).await
    }
}
