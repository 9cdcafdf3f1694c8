//! HTTP error mapping.
//!
//! # Responsibility
//! - Translate core errors into status codes and stable machine codes.
//! - Render every failure as a JSON `{error, code}` body.
//!
//! # Invariants
//! - Storage failures never leak internal detail to clients; the detail is
//!   logged instead.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use azalea_core::db::DbError;
use azalea_core::{BookingError, BookingErrorKind, ManifestError, RepoError};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const STORAGE_FAILURE_MESSAGE: &str = "Internal storage failure. Please try again later.";

/// Error returned by request handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    pub fn not_configured() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_CONFIGURED",
            BookingError::NotConfigured.to_string(),
        )
    }

    pub fn not_found(resource: &str, id: impl Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{resource} with id {id} not found"),
        )
    }

    /// Logs `detail` and returns a generic 500.
    pub fn storage(detail: impl Display) -> Self {
        error!("event=storage_failure module=server status=error error={detail}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_FAILURE",
            STORAGE_FAILURE_MESSAGE,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

impl Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value.kind() {
            BookingErrorKind::InvalidInput => Self::invalid_input(value.to_string()),
            BookingErrorKind::DuplicateEmail => {
                Self::new(StatusCode::CONFLICT, "DUPLICATE_EMAIL", value.to_string())
            }
            BookingErrorKind::Configuration => Self::not_configured(),
            BookingErrorKind::Storage => Self::storage(value),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::storage(value)
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::storage(value)
    }
}

impl From<ManifestError> for ApiError {
    fn from(value: ManifestError) -> Self {
        Self::storage(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

/// Startup and serve-loop failures.
#[derive(Debug)]
pub enum ServerError {
    Db(DbError),
    Repo(RepoError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database startup failed: {err}"),
            Self::Repo(err) => write!(f, "flight configuration load failed: {err}"),
            Self::Io(err) => write!(f, "server io failed: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for ServerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
