//! Data models for the RDFI (receiving) service

use serde::{Deserialize, Serialize};

pub const STATUS_RECEIVED: &str = "RECEIVED";
pub const STATUS_POSTED: &str = "POSTED";
pub const STATUS_RETURNED: &str = "RETURNED";

/// A received ACH entry as stored by the RDFI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfiEntry {
    pub id: String,
    pub trace_number: String,
    #[serde(default)]
    pub receiver_name: String,
    pub amount_cents: i64,
    pub status: String,
    /// Only present once the entry has been returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl RdfiEntry {
    /// The return reason, treating an empty string as absent
    pub fn return_reason(&self) -> Option<&str> {
        self.return_reason.as_deref().filter(|r| !r.is_empty())
    }
}

/// Request body for `POST /api/v1/entries`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRdfiEntryRequest {
    pub trace_number: String,
    #[serde(default)]
    pub receiver_name: String,
    pub amount_cents: i64,
}

/// Request body for `POST /api/v1/entries/{id}/return`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub reason: String,
}
