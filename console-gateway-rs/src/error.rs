//! Gateway error type and its HTTP mapping

use ach_sdk::{ErrorContext, ServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::models::Side;
use crate::validation::ApiValidationError;

/// Error body returned by every route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The side selector is not ODFI or RDFI (or an alias)
    #[error("invalid side '{0}': expected ODFI or RDFI")]
    InvalidSide(String),

    /// A side was requested that no registered source serves
    #[error("no source registered for side {0}")]
    NoSourceForSide(Side),

    /// A single backend call failed outside of aggregation
    #[error(transparent)]
    Upstream(#[from] ServiceError),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ApiValidationError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSide(_) | Self::NoSourceForSide(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            Self::Upstream(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn upstream_context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Upstream(err) => err.context(),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Some(context) = self.upstream_context().filter(|_| status.is_server_error()) {
            tracing::error!(
                service = %context.service,
                endpoint = context.endpoint.as_deref().unwrap_or("-"),
                observed_at = %context.timestamp.to_rfc3339(),
                data = ?context.data,
                "Upstream failure: {}",
                self
            );
        } else if status.is_server_error() {
            tracing::error!("Upstream failure: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
