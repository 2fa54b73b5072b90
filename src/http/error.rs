use std::borrow::Cow;

use axum::response::IntoResponse;
use axum::Json;
use hyper::StatusCode;

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_repr::Serialize_repr)]
#[repr(u16)]
pub enum ApiErrorCode {
    // Request Errors
    MissingParameter = 1000,

    // Resource Errors
    RouteNotFound = 2000,
    NoResults = 2001,
    NoEligibleGame = 2002,

    // Service Errors
    UpstreamUnavailable = 3000,
    ScrapeFailure = 3001,
    SessionUnavailable = 3002,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub status: Cow<'static, str>,
    pub error_code: ApiErrorCode,
    pub error: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            status: status_code.canonical_reason().unwrap_or("unknown").into(),
            error_code,
            error: error.into(),
        }
    }

    pub fn bad_request(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_code, error)
    }

    pub fn not_found(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_code, error)
    }

    pub fn internal_server_error(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error_code, error)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::MissingParameter(_) => Self::bad_request(ApiErrorCode::MissingParameter, message),
            ServiceError::NotFound(_) => Self::not_found(ApiErrorCode::NoResults, message),
            ServiceError::UpstreamUnavailable { .. } => {
                Self::internal_server_error(ApiErrorCode::UpstreamUnavailable, message)
            }
            ServiceError::ScrapeFailure(_) => Self::internal_server_error(ApiErrorCode::ScrapeFailure, message),
            ServiceError::SessionUnavailable(_) => {
                Self::internal_server_error(ApiErrorCode::SessionUnavailable, message)
            }
            ServiceError::NoEligibleGame => Self::internal_server_error(ApiErrorCode::NoEligibleGame, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        (self.status_code, Json(self)).into_response()
    }
}
