//! Application error handling

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::StorageError;
use crate::fhir::FhirClientError;

/// Application error type
///
/// Every failure a handler can produce ends up here; the conversion to a
/// status code happens only in [`IntoResponse`].
#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    TooManyRequests(String),
    StorageUnavailable(String),
    StorageFailure(String),
    FhirFailure(String),
    Internal(String),
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StorageFailure(_) | AppError::FhirFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_detail(self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::TooManyRequests(msg)
            | AppError::StorageUnavailable(msg)
            | AppError::StorageFailure(msg)
            | AppError::FhirFailure(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = matches!(self, AppError::Unauthorized(_));
        let detail = self.into_detail();

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), detail = %detail, "Request failed");
        }

        let mut response = (status, Json(ErrorBody { detail })).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(msg) => AppError::Internal(format!("Failed to sign token: {}", msg)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => {
                AppError::StorageUnavailable(format!("Database connection failed: {}", msg))
            }
            StorageError::Failure(msg) => {
                AppError::StorageFailure(format!("Database query failed: {}", msg))
            }
        }
    }
}

impl From<FhirClientError> for AppError {
    fn from(err: FhirClientError) -> Self {
        match err {
            FhirClientError::NotFound(msg) => AppError::NotFound(msg),
            FhirClientError::Failure(msg) => AppError::FhirFailure(format!("FHIR error: {}", msg)),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Missing content type, unparsable JSON and wrong field types are all 400.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
