//! Data models for the exception/investigation (EIP) service

use serde::{Deserialize, Serialize};

use crate::core::push_param;

pub const STATUS_OPEN: &str = "OPEN";
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_RESOLVED: &str = "RESOLVED";

pub const TYPE_RETURN_REVIEW: &str = "RETURN_REVIEW";
pub const TYPE_NOC_REVIEW: &str = "NOC_REVIEW";
pub const TYPE_CUSTOMER_DISPUTE: &str = "CUSTOMER_DISPUTE";

/// An exception or investigation case opened against an ACH entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EipCase {
    pub id: String,
    pub side: String,
    pub trace_number: String,
    pub status: String,
    #[serde(rename = "type")]
    pub case_type: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for `POST /api/v1/cases`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseRequest {
    pub side: String,
    pub trace_number: String,
    #[serde(rename = "type")]
    pub case_type: String,
    #[serde(default)]
    pub notes: String,
}

/// Request body for `PATCH /api/v1/cases/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCaseStatusRequest {
    pub status: String,
}

/// Optional filters for `GET /api/v1/cases`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub status: Option<String>,
    pub side: Option<String>,
    pub trace_number: Option<String>,
}

impl CaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }

    pub fn trace_number(mut self, trace_number: impl Into<String>) -> Self {
        self.trace_number = Some(trace_number.into());
        self
    }

    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_param(&mut params, "status", self.status.as_deref());
        push_param(&mut params, "side", self.side.as_deref());
        push_param(&mut params, "trace_number", self.trace_number.as_deref());
        params
    }
}
