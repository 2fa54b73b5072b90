use thiserror::Error;

/// Failure kinds shared by every upstream integration.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller did not supply a required query parameter.
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// A third-party service could not be reached or answered with a non-2xx status.
    #[error("{service} unavailable{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    UpstreamUnavailable {
        service: &'static str,
        status: Option<u16>,
    },

    /// Navigation, selector wait, or extraction failed while scraping.
    #[error("scrape failed: {0}")]
    ScrapeFailure(String),

    /// No browser session could be obtained.
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    /// The backlog query matched no eligible documents.
    #[error("no eligible game in backlog")]
    NoEligibleGame,

    #[error("{0}")]
    NotFound(&'static str),
}

impl ServiceError {
    pub fn upstream(service: &'static str, status: Option<u16>) -> Self {
        Self::UpstreamUnavailable { service, status }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
