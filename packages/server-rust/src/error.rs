//! Request-level errors and their HTTP responses.
//!
//! Validation failures are not errors here: handlers re-render the form
//! with field messages. What remains is "no such wine" and internal
//! failures, whose causes are logged but never shown to the client.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::render::Views;

/// Errors a wine handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The path does not name an existing wine.
    #[error("wine not found")]
    NotFound,
    /// The store failed.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
    /// A template failed to render.
    #[error("template error: {0}")]
    Render(#[from] tera::Error),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        if !matches!(self, Self::NotFound) {
            error!(error = %self, "request failed");
        }
    }

    /// Renders the error as an HTML page, falling back to plain text if the
    /// page itself cannot be rendered.
    pub fn into_page(self, views: &Views) -> Response {
        self.log();
        let status = self.status();
        let page = match self {
            Self::NotFound => views.not_found(),
            Self::Storage(_) | Self::Render(_) => views.server_error(),
        };
        match page {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!(error = %e, "error page failed to render");
                plain(status)
            }
        }
    }
}

/// Plain-text response when no view renderer is at hand.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        plain(self.status())
    }
}

fn plain(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or("error")).into_response()
}
