use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{join_url, send, GameSearch, SearchQuery};
use crate::config::NintendoConfig;
use crate::error::{Result, ServiceError};

const SERVICE: &str = "nintendo";

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(default)]
    docs: Vec<Value>,
}

/// Nintendo product search (Solr `select` endpoint).
#[derive(Debug, Clone)]
pub struct NintendoClient {
    client: reqwest::Client,
    base_url: String,
    config: NintendoConfig,
}

impl NintendoClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, config: NintendoConfig) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            config,
        }
    }
}

/// Keeps only documents describing an actual game (`type == "GAME"`).
pub fn games_only(docs: Vec<Value>) -> Vec<Value> {
    docs.into_iter()
        .filter(|doc| doc.get("type").and_then(Value::as_str) == Some("GAME"))
        .collect()
}

#[async_trait]
impl GameSearch for NintendoClient {
    type Output = Vec<Value>;

    #[tracing::instrument(skip(self), fields(title = %query.title))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>> {
        let rows = self.config.rows.to_string();
        let request = self.client.get(join_url(&self.base_url, "/en/select")).query(&[
            ("fq", self.config.filter_query.as_str()),
            ("q", query.title.as_str()),
            ("sort", self.config.sort.as_str()),
            ("start", "0"),
            ("rows", rows.as_str()),
            ("wt", "json"),
        ]);

        let parsed: SelectResponse = send(SERVICE, request).await?.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse nintendo search response");
            ServiceError::upstream(SERVICE, None)
        })?;

        let games = games_only(parsed.response.docs);
        tracing::debug!(count = games.len(), "nintendo search complete");

        Ok(games)
    }
}
