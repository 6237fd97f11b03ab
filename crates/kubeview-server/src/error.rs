//! Error responses.

use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use thiserror::Error;
use tower::timeout::error::Elapsed;

use kubeview_types::ErrorBody;

/// Errors returned by the REST handlers.
///
/// Upstream failures are not classified: not-found, forbidden and transport
/// errors all become a 500 carrying the upstream message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a failure raised by the REST middleware stack.
    pub fn from_middleware(err: BoxError, timeout: Duration) -> Self {
        if err.is::<Elapsed>() {
            ApiError::Upstream(anyhow::anyhow!(
                "Control plane did not answer within {}s",
                timeout.as_secs()
            ))
        } else {
            ApiError::Upstream(anyhow::anyhow!("Request failed: {}", err))
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<WebSocketUpgradeRejection> for ApiError {
    fn from(rejection: WebSocketUpgradeRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Upstream request failed");
        } else {
            tracing::debug!(error = %message, "Rejected request");
        }

        (status, Json(ErrorBody::new(message))).into_response()
    }
}
