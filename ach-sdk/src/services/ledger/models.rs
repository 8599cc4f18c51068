//! Data models for the ledger service

use serde::{Deserialize, Serialize};

use crate::core::push_param;

pub const DIRECTION_DEBIT: &str = "DEBIT";
pub const DIRECTION_CREDIT: &str = "CREDIT";

/// A single ledger posting tied to an ACH trace number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPosting {
    pub id: String,
    pub ach_side: String,
    pub trace_number: String,
    pub amount_cents: i64,
    pub direction: String,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
}

/// Request body for `POST /api/v1/postings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostingRequest {
    pub ach_side: String,
    pub trace_number: String,
    pub amount_cents: i64,
    pub direction: String,
    #[serde(default)]
    pub description: String,
}

/// Totals computed over every posting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub total_debits: i64,
    pub total_credits: i64,
    pub net_balance: i64,
}

/// Optional filters for `GET /api/v1/postings`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    pub ach_side: Option<String>,
    pub trace_number: Option<String>,
}

impl PostingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ach_side(mut self, side: impl Into<String>) -> Self {
        self.ach_side = Some(side.into());
        self
    }

    pub fn trace_number(mut self, trace_number: impl Into<String>) -> Self {
        self.trace_number = Some(trace_number.into());
        self
    }

    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_param(&mut params, "ach_side", self.ach_side.as_deref());
        push_param(&mut params, "trace_number", self.trace_number.as_deref());
        params
    }
}
