//! Error mapping for backend responses
//!
//! The record-keeping services answer failures with a JSON body of the form
//! `{"error": "<message>"}`. This module turns a status code plus body into the
//! matching [`ServiceError`] variant.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Longest body excerpt carried into an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Extract the human readable message from an error body
fn extract_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    json.get("error")
        .or_else(|| json.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Map a backend HTTP error to a ServiceError
pub fn map_http_error(status: StatusCode, body: &str, context: &ErrorContext) -> ServiceError {
    let detail = match extract_message(body) {
        Some(message) => message,
        None if body.trim().is_empty() => String::new(),
        None if body.len() > MAX_BODY_EXCERPT => {
            let cut = (0..=MAX_BODY_EXCERPT)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...", &body[..cut])
        }
        None => body.trim().to_string(),
    };

    let message = if detail.is_empty() {
        format!(
            "{} service returned status {}",
            context.service.to_uppercase(),
            status.as_u16()
        )
    } else {
        format!(
            "{} service returned status {}: {}",
            context.service.to_uppercase(),
            status.as_u16(),
            detail
        )
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::validation(message),
        StatusCode::NOT_FOUND => ServiceError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::timeout(message),
        _ => ServiceError::service(message),
    }
}
