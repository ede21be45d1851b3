//! Error handlers
//!
//! Maps errors onto HTTP responses and logs them.

use crate::error::types::{StorageError, WebError};
use crate::server::render;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use log::{error, warn};

/// Log a request error at a level matching its severity
pub fn handle_error(err: &WebError) {
    let status = error_to_status(err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected ({}): {}", status.as_u16(), err);
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &WebError) -> StatusCode {
    match err {
        WebError::Storage(e) => storage_error_to_status(e),
        WebError::Validation(_) => StatusCode::BAD_REQUEST,
        WebError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::FileNotFound(_)
        | StorageError::DirectoryNotFound(_)
        | StorageError::NotADirectory(_)
        | StorageError::NotAFile(_) => StatusCode::NOT_FOUND,
        StorageError::DirectoryNotEmpty(_) => StatusCode::CONFLICT,
        StorageError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        StorageError::InvalidName(_) | StorageError::PathTraversal(_) => StatusCode::BAD_REQUEST,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Short message shown to the client; internal details stay in the log
fn public_message(err: &WebError) -> &'static str {
    match err {
        WebError::Storage(StorageError::FileNotFound(_)) => "File not found",
        WebError::Storage(StorageError::NotAFile(_)) => "File not found",
        WebError::Storage(StorageError::DirectoryNotFound(_))
        | WebError::Storage(StorageError::NotADirectory(_)) => "Folder not found",
        WebError::Storage(StorageError::DirectoryNotEmpty(_)) => "Folder is not empty",
        WebError::Storage(StorageError::PermissionDenied(_)) => "Permission denied",
        WebError::Storage(StorageError::PathTraversal(_)) => "Path outside of your storage",
        WebError::Storage(StorageError::InvalidName(_)) => "Invalid name",
        WebError::Validation(_) => "Invalid request",
        WebError::Storage(StorageError::IoError(_)) | WebError::IoError(_) => {
            "Internal server error"
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status(&self);
        (status, Html(render::error_page(status, public_message(&self)))).into_response()
    }
}
