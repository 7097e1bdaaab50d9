//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Boxed error type accepted from page authors' state loaders and renderers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registration-time failures. Fatal to the one route being registered,
/// reported with the module's path relative to the server dist directory.
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("route configuration path must be specified, check {file}")]
    MissingPath { file: String },
    #[error("route configuration path must be a string, check {file}")]
    PathNotString { file: String },
    #[error("route configuration path must start with '/', check {file}")]
    PathNotAbsolute { file: String },
    #[error("route {method} {path} is already registered, check {file}")]
    DuplicateRoute {
        method: String,
        path: String,
        file: String,
    },
    #[error("route configuration method must be a string, check {file}")]
    MethodNotString { file: String },
    #[error("route configuration method '{method}' is not a valid HTTP method, check {file}")]
    UnsupportedMethod { method: String, file: String },
    #[error("module does not export a route object, check {file}")]
    MissingRoute { file: String },
    #[error("module does not export a page component, check {file}")]
    MissingComponent { file: String },
}

/// Per-request failures. Returned from handlers instead of panicking so the
/// host's error pipeline renders them.
#[derive(Error, Debug)]
pub enum PageError {
    #[error(
        "the layout defined in this route cannot be rendered from the server, \
         only string or markup-tree layouts are supported"
    )]
    UnsupportedLayout,
    #[error("state serialization: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Upstream(BoxError),
}

impl PageError {
    /// Wraps an arbitrary author-side error (state loader, component render).
    pub fn upstream(err: impl Into<BoxError>) -> Self {
        PageError::Upstream(err.into())
    }
}

/// Build failures, tagged with the step that produced them.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("template build: {0}")]
    Templates(#[source] BoxError),
    #[error("client bundle build: {0}")]
    Client(#[source] BoxError),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let code = match &self {
            PageError::UnsupportedLayout => "unsupported_layout",
            PageError::Serialize(_) => "state_serialization",
            PageError::Upstream(_) => "page_error",
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
