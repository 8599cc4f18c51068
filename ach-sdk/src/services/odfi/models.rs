//! Data models for the ODFI (origination) service

use serde::{Deserialize, Serialize};

/// Entry awaiting transmission
pub const STATUS_PENDING: &str = "PENDING";
/// Entry transmitted to the network
pub const STATUS_SENT: &str = "SENT";
/// Entry withdrawn before transmission
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// An originated ACH entry as stored by the ODFI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdfiEntry {
    pub id: String,
    pub trace_number: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub sec_code: String,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for `POST /api/v1/entries`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOdfiEntryRequest {
    pub trace_number: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub sec_code: String,
    pub amount_cents: i64,
}

/// Request body for `PATCH /api/v1/entries/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}
