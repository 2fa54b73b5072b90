use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use super::{join_url, json_body, send, GameSearch, SearchQuery};
use crate::error::Result;

const SERVICE: &str = "howlongtobeat";

/// HowLongToBeat search API client. Responses are forwarded untouched.
#[derive(Debug, Clone)]
pub struct HltbClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl HltbClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            page_size,
        }
    }

    pub(crate) fn request_body(&self, query: &SearchQuery) -> serde_json::Value {
        // HowLongToBeat expects a one-element array here, `[null]` without a year.
        let year = [query.year.as_deref()];

        json!({
            "searchType": "games",
            "searchTerms": [query.title],
            "searchPage": 1,
            "size": self.page_size,
            "searchOptions": {
                "games": {
                    "userId": 0,
                    "platform": "",
                    "sortCategory": "popular",
                    "rangeCategory": "main",
                    "rangeTime": { "min": 0, "max": 0 },
                    "rangeYear": { "min": year, "max": year },
                    "gameplay": { "perspective": "", "flow": "", "genre": "" },
                    "modifier": ""
                },
                "users": { "sortCategory": "postcount" },
                "filter": "",
                "sort": 0,
                "randomizer": 0
            }
        })
    }
}

#[async_trait]
impl GameSearch for HltbClient {
    type Output = Bytes;

    #[tracing::instrument(skip(self), fields(title = %query.title))]
    async fn search(&self, query: &SearchQuery) -> Result<Bytes> {
        let request = self
            .client
            .post(join_url(&self.base_url, "/api/search"))
            .header("Content-Type", "application/json")
            .header("Referer", join_url(&self.base_url, "/"))
            .json(&self.request_body(query));

        let body = json_body(SERVICE, send(SERVICE, request).await?).await?;

        tracing::debug!(bytes = body.len(), "howlongtobeat search complete");

        Ok(body)
    }
}
