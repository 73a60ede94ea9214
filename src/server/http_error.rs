//! Translation of service errors to HTTP responses.

use crate::error::Error;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Error surface of the request handlers.
///
/// Every failure maps to a status code and a JSON body with one `error`
/// field; requests never escalate to an unhandled fault.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (bad multipart body, oversize upload).
    BadRequest(String),
    /// A service-level failure, mapped by taxonomy.
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Service(err) => (status_for(&err), err.to_string()),
        };

        warn!("Request failed ({status}): {message}");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Map a service error to its client-facing status code.
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::UnsupportedAudioFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::AudioOpen { .. }
        | Error::AudioDecode { .. }
        | Error::NoAudioTracks { .. }
        | Error::EmptyAudio
        | Error::Resample { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::UploadNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
