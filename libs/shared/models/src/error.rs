use axum::{
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::flash::Flash;

/// A failed call against the identity, store or blob boundary. Carries the
/// raw provider message so handlers can surface it verbatim.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RemoteError {
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote service error: {0}")]
    Remote(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Unauthenticated requests land on the login page, the way the
            // session layer's login_view did.
            AppError::Auth(msg) => {
                tracing::debug!("rejecting unauthenticated request: {}", msg);
                let flash = Flash::warning("Please log in to access this page.");
                (
                    StatusCode::SEE_OTHER,
                    [(LOCATION, "/auth/login")],
                    Json(json!({ "redirect": "/auth/login", "flash": flash })),
                )
                    .into_response()
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Remote(msg) => {
                tracing::error!("remote boundary failure: {}", msg);
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}
