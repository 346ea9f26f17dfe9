//! Error types, one enum per concern, plus the HTTP-facing `ApiError`.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectIdError {
    #[error("invalid project id {code:?}: {reason}")]
    InvalidFormat { code: String, reason: &'static str },

    #[error("project number {0} has no display code (max is ZZ99)")]
    OutOfRange(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriterionError {
    #[error("criterion {0:?} has no qualityLevels")]
    MissingQualityLevels(String),
}

/// Failures while loading the criteria catalogue. All of them abort startup.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("cannot read criteria file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse criteria file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid criteria catalogue: {0}")]
    Configuration(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Errors surfaced to HTTP clients as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProjectIdError> for ApiError {
    fn from(e: ProjectIdError) -> Self {
        match e {
            ProjectIdError::InvalidFormat { .. } => ApiError::BadRequest(e.to_string()),
            // Only reachable when the counter runs out of codes.
            ProjectIdError::OutOfRange(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(target: "ipa_backend", error = %self, "request failed");
        }
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}
