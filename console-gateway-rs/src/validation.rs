//! Console Gateway Input Validation
//!
//! Query parameters for `GET /api/v1/ach-items` are parsed here into an
//! [`AggregateQuery`]. Paging values are lenient (bad values fall back to
//! defaults); selectors and sort parameters are strict.

use serde::Deserialize;

use ach_sdk::EntryFilter;

use crate::aggregator::AggregateQuery;
use crate::error::GatewayError;
use crate::models::Side;
use crate::sorting::{Page, SortField, SortOrder, SortSpec};

/// Validation error for API requests
#[derive(Debug, thiserror::Error)]
pub enum ApiValidationError {
    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidParameter { field: &'static str, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Paging limits applied to aggregate queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_limit: config_rs::DEFAULT_ITEMS_LIMIT,
            max_limit: config_rs::MAX_ITEMS_LIMIT,
        }
    }
}

/// Raw query string of `GET /api/v1/ach-items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AchItemsParams {
    pub side: Option<String>,
    pub status: Option<String>,
    pub trace_number: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl AchItemsParams {
    pub fn into_query(self, limits: Limits) -> Result<AggregateQuery, GatewayError> {
        let side = non_empty(self.side.as_deref())
            .map(str::parse::<Side>)
            .transpose()?;

        let field = match non_empty(self.sort_by.as_deref()) {
            Some(raw) => raw.parse::<SortField>()?,
            None => SortField::default(),
        };
        let order = match non_empty(self.sort_order.as_deref()) {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };

        let mut filter = EntryFilter::new();
        filter.status = non_empty(self.status.as_deref()).map(str::to_string);
        filter.trace_number = non_empty(self.trace_number.as_deref()).map(str::to_string);

        Ok(AggregateQuery {
            side,
            filter,
            sort: SortSpec { field, order },
            page: Page {
                limit: parse_limit(self.limit.as_deref(), limits),
                offset: parse_offset(self.offset.as_deref()),
            },
        })
    }
}

/// Page size: default when absent, non-positive or unparsable; capped at the max
pub fn parse_limit(raw: Option<&str>, limits: Limits) -> usize {
    match non_empty(raw).and_then(|v| v.parse::<i64>().ok()) {
        Some(limit) if limit > 0 => (limit as u64).min(limits.max_limit as u64) as usize,
        _ => limits.default_limit,
    }
}

/// Offset: zero when absent, negative or unparsable
pub fn parse_offset(raw: Option<&str>) -> usize {
    non_empty(raw)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
}

/// Reject empty or whitespace-only body fields
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ApiValidationError> {
    if value.trim().is_empty() {
        return Err(ApiValidationError::MissingField(field));
    }
    Ok(())
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}
