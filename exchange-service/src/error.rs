//! API error types for HTTP responses.
//!
//! Each variant's message text is stable and client-observable; keep it
//! unchanged across refactors since clients match on it.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Incoming data was not valid JSON")]
    BadJson,
    #[error("Incoming POST data disagreed with request URL")]
    UrlMismatch,
    #[error("Incoming POST was missing required field")]
    MissingField,
    #[error("A value in the POST had the wrong type")]
    BadType,
    #[error("Illegal value (usually a non-positive number)")]
    BadValue,
    #[error("Unacceptable length of account, venue, or symbol")]
    BadName,
    #[error("Book limit exceeded! (See command line options)")]
    BookError,
    #[error("Maximum number of accounts exceeded")]
    TooManyAccounts,
    #[error("No such order for that Exchange + Symbol combo")]
    NoSuchOrder,
    #[error("Venue {0} does not exist (create it by using it)")]
    NoSuchVenue(String),
    #[error("Server is in +authentication mode but no API key was received")]
    NoAuthError,
    #[error("Unknown account or wrong API key")]
    AuthFailure,
    #[error("Account of stored data had no associated API key (this is impossible)")]
    AuthWeirdfail,
    #[error("Disabled or not enabled. (See command line options)")]
    Disabled,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadJson
            | ApiError::UrlMismatch
            | ApiError::MissingField
            | ApiError::BadType
            | ApiError::BadValue
            | ApiError::BadName
            | ApiError::BookError
            | ApiError::NoSuchOrder => StatusCode::BAD_REQUEST,
            ApiError::NoSuchVenue(_) => StatusCode::NOT_FOUND,
            ApiError::NoAuthError | ApiError::AuthFailure | ApiError::AuthWeirdfail => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::TooManyAccounts | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Disabled => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorBody {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
