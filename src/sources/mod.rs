use async_trait::async_trait;
use bytes::Bytes;
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::error::{Result, ServiceError};

pub mod hltb;
pub mod nintendo;
pub mod reviews;

#[cfg(test)]
mod tests;

/// Raw query-string parameters shared by the search routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub platform: Option<String>,
    pub exact: Option<bool>,
}

/// A validated search request. The title is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub year: Option<String>,
    pub kind: Option<String>,
    pub platform: Option<String>,
    pub exact: Option<bool>,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            kind: None,
            platform: None,
            exact: None,
        }
    }
}

impl TryFrom<SearchParams> for SearchQuery {
    type Error = ServiceError;

    fn try_from(params: SearchParams) -> Result<Self> {
        let title = params
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::MissingParameter("title"))?;

        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(Self {
            title,
            year: non_empty(params.year),
            kind: non_empty(params.kind),
            platform: non_empty(params.platform),
            exact: params.exact,
        })
    }
}

/// One upstream capability: resolve a search query to some payload.
#[async_trait]
pub trait GameSearch: Send + Sync {
    type Output: Send;

    async fn search(&self, query: &SearchQuery) -> Result<Self::Output>;
}

/// Sends a request and rejects transport failures and non-2xx statuses.
pub(crate) async fn send(service: &'static str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(error = %e, service, "upstream request failed");
        ServiceError::upstream(service, e.status().map(|s| s.as_u16()))
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(service, status = status.as_u16(), "upstream returned non-success status");
        return Err(ServiceError::upstream(service, Some(status.as_u16())));
    }

    Ok(response)
}

/// Reads a successful response body, rejecting anything that is not JSON.
/// The bytes are returned unchanged so callers can forward them verbatim.
pub(crate) async fn json_body(service: &'static str, response: reqwest::Response) -> Result<Bytes> {
    let body = response.bytes().await.map_err(|e| {
        tracing::error!(error = %e, service, "failed to read upstream response");
        ServiceError::upstream(service, None)
    })?;

    if let Err(e) = serde_json::from_slice::<IgnoredAny>(&body) {
        tracing::error!(error = %e, service, bytes = body.len(), "upstream returned a non-JSON body");
        return Err(ServiceError::upstream(service, None));
    }

    Ok(body)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
