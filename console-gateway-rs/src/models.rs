//! Unified record shapes returned by the console
//!
//! A [`UnifiedAchItem`] carries the fields shared by both sides at the top
//! level; the side-specific fields live in [`SideExtra`], which only ever holds
//! what the originating backend actually produced.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Which record-keeping backend an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Origination (outbound) entries
    Odfi,
    /// Receiving (inbound) entries
    Rdfi,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Odfi => "ODFI",
            Side::Rdfi => "RDFI",
        }
    }

    /// Lowercase backend name used as the `source` field
    pub fn source(&self) -> &'static str {
        match self {
            Side::Odfi => "odfi",
            Side::Rdfi => "rdfi",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ODFI" | "ORIGIN" | "ORIGINATION" => Ok(Side::Odfi),
            "RDFI" | "RECEIVING" | "RECEIVER" => Ok(Side::Rdfi),
            _ => Err(GatewayError::InvalidSide(s.to_string())),
        }
    }
}

/// Side-specific fields of a unified record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SideExtra {
    Origination {
        company_name: String,
        sec_code: String,
    },
    Receiving {
        receiver_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_reason: Option<String>,
    },
}

/// One ACH entry from either side in a common shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedAchItem {
    pub side: Side,
    pub source: String,
    pub entry_id: String,
    pub trace_number: String,
    pub amount_cents: i64,
    pub status: String,
    /// RFC 3339 timestamp as reported by the backend
    pub created_at: String,
    pub extra: SideExtra,
}

impl UnifiedAchItem {
    pub fn company_name(&self) -> Option<&str> {
        match &self.extra {
            SideExtra::Origination { company_name, .. } => Some(company_name),
            SideExtra::Receiving { .. } => None,
        }
    }

    pub fn receiver_name(&self) -> Option<&str> {
        match &self.extra {
            SideExtra::Receiving { receiver_name, .. } => Some(receiver_name),
            SideExtra::Origination { .. } => None,
        }
    }

    pub fn return_reason(&self) -> Option<&str> {
        match &self.extra {
            SideExtra::Receiving { return_reason, .. } => return_reason.as_deref(),
            SideExtra::Origination { .. } => None,
        }
    }
}

/// Per-backend availability attached to an aggregated response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency: String,
}

impl ServiceHealth {
    pub fn up(service: impl Into<String>, latency: Duration) -> Self {
        Self {
            service: service.into(),
            available: true,
            error: None,
            latency: format_latency(latency),
        }
    }

    pub fn down(service: impl Into<String>, error: impl Into<String>, latency: Duration) -> Self {
        Self {
            service: service.into(),
            available: false,
            error: Some(error.into()),
            latency: format_latency(latency),
        }
    }
}

/// Millisecond-rounded latency, e.g. `"2ms"` or `"1.5s"`
fn format_latency(latency: Duration) -> String {
    let millis = (latency.as_micros() + 500) / 1000;
    match u64::try_from(millis) {
        Ok(0) => "0s".to_string(),
        Ok(ms) => format!("{:?}", Duration::from_millis(ms)),
        Err(_) => format!("{:?}", latency),
    }
}

/// Result of one aggregate call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResponse {
    /// The requested page of the sorted merge
    pub items: Vec<UnifiedAchItem>,
    /// One entry per queried backend, in completion order
    pub service_info: Vec<ServiceHealth>,
    /// True iff at least one queried backend failed
    pub partial: bool,
    /// Size of the merged set before pagination
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_side_aliases() {
        assert_eq!("odfi".parse::<Side>().unwrap(), Side::Odfi);
        assert_eq!("Origin".parse::<Side>().unwrap(), Side::Odfi);
        assert_eq!("ORIGINATION".parse::<Side>().unwrap(), Side::Odfi);
        assert_eq!("rdfi".parse::<Side>().unwrap(), Side::Rdfi);
        assert_eq!("receiving".parse::<Side>().unwrap(), Side::Rdfi);
        assert_eq!("RECEIVER".parse::<Side>().unwrap(), Side::Rdfi);
        assert!(matches!(
            "UNKNOWN".parse::<Side>(),
            Err(GatewayError::InvalidSide(s)) if s == "UNKNOWN"
        ));
        assert!("".parse::<Side>().is_err());
    }

    #[test]
    fn test_item_serialization() {
        let item = UnifiedAchItem {
            side: Side::Rdfi,
            source: "rdfi".to_string(),
            entry_id: "r-1".to_string(),
            trace_number: "061000050000001".to_string(),
            amount_cents: 500,
            status: "RECEIVED".to_string(),
            created_at: "2024-01-01T12:00:00Z".to_string(),
            extra: SideExtra::Receiving {
                receiver_name: "Jane Doe".to_string(),
                return_reason: None,
            },
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["side"], json!("RDFI"));
        assert_eq!(value["extra"], json!({"receiver_name": "Jane Doe"}));
        assert_eq!(item.receiver_name(), Some("Jane Doe"));
        assert_eq!(item.company_name(), None);
    }

    #[test]
    fn test_degraded_health_serialization() {
        let health = ServiceHealth::down("odfi", "connection refused", Duration::from_millis(3));
        let value = serde_json::to_value(&health).unwrap();

        assert_eq!(value["available"], json!(false));
        assert_eq!(value["error"], json!("connection refused"));
        assert_eq!(value["latency"], json!("3ms"));

        let healthy = serde_json::to_value(ServiceHealth::up("rdfi", Duration::from_millis(1))).unwrap();
        assert!(healthy.get("error").is_none());
    }

    #[test]
    fn test_latency_rounds_to_milliseconds() {
        assert_eq!(format_latency(Duration::from_micros(1_520)), "2ms");
        assert_eq!(format_latency(Duration::from_micros(1_499)), "1ms");
        assert_eq!(format_latency(Duration::from_micros(300)), "0s");
        assert_eq!(format_latency(Duration::from_millis(1_500)), "1.5s");
    }
}
