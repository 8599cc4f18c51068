//! Native record to unified record mapping
//!
//! Both functions are total over well-formed native records. A record whose
//! `created_at` is not an RFC 3339 timestamp is malformed; callers treat that
//! like any other backend failure.

use ach_sdk::odfi::OdfiEntry;
use ach_sdk::rdfi::RdfiEntry;
use ach_sdk::{ErrorContext, Result, ServiceError};
use chrono::DateTime;

use crate::models::{Side, SideExtra, UnifiedAchItem};

pub fn normalize_odfi(entry: OdfiEntry) -> Result<UnifiedAchItem> {
    check_created_at(Side::Odfi, &entry.id, &entry.created_at)?;

    Ok(UnifiedAchItem {
        side: Side::Odfi,
        source: Side::Odfi.source().to_string(),
        entry_id: entry.id,
        trace_number: entry.trace_number,
        amount_cents: entry.amount_cents,
        status: entry.status,
        created_at: entry.created_at,
        extra: SideExtra::Origination {
            company_name: entry.company_name,
            sec_code: entry.sec_code,
        },
    })
}

pub fn normalize_rdfi(entry: RdfiEntry) -> Result<UnifiedAchItem> {
    check_created_at(Side::Rdfi, &entry.id, &entry.created_at)?;

    let return_reason = entry.return_reason().map(str::to_string);
    Ok(UnifiedAchItem {
        side: Side::Rdfi,
        source: Side::Rdfi.source().to_string(),
        entry_id: entry.id,
        trace_number: entry.trace_number,
        amount_cents: entry.amount_cents,
        status: entry.status,
        created_at: entry.created_at,
        extra: SideExtra::Receiving {
            receiver_name: entry.receiver_name,
            return_reason,
        },
    })
}

/// Normalize a whole list, failing on the first malformed record
pub fn normalize_all<T, F>(entries: Vec<T>, normalize: F) -> Result<Vec<UnifiedAchItem>>
where
    F: Fn(T) -> Result<UnifiedAchItem>,
{
    entries.into_iter().map(normalize).collect()
}

fn check_created_at(side: Side, id: &str, created_at: &str) -> Result<()> {
    DateTime::parse_from_rfc3339(created_at)
        .map(|_| ())
        .map_err(|e| {
            ServiceError::parsing(format!(
                "{} entry {} has invalid created_at '{}': {}",
                side, id, created_at, e
            ))
            .with_context(ErrorContext::for_service(side.source()).with("entry_id", id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odfi_entry(created_at: &str) -> OdfiEntry {
        OdfiEntry {
            id: "o-1".to_string(),
            trace_number: "091000010000001".to_string(),
            company_name: "Acme Payroll".to_string(),
            sec_code: "PPD".to_string(),
            amount_cents: 1000,
            status: "PENDING".to_string(),
            created_at: created_at.to_string(),
            updated_at: String::new(),
        }
    }

    fn rdfi_entry(return_reason: Option<&str>) -> RdfiEntry {
        RdfiEntry {
            id: "r-1".to_string(),
            trace_number: "061000050000001".to_string(),
            receiver_name: "Jane Doe".to_string(),
            amount_cents: 500,
            status: "RECEIVED".to_string(),
            return_reason: return_reason.map(str::to_string),
            created_at: "2024-01-01T12:00:00Z".to_string(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_odfi_mapping() {
        let item = normalize_odfi(odfi_entry("2024-01-01T00:00:00Z")).unwrap();

        assert_eq!(item.side, Side::Odfi);
        assert_eq!(item.source, "odfi");
        assert_eq!(item.entry_id, "o-1");
        assert_eq!(item.amount_cents, 1000);
        assert_eq!(
            item.extra,
            SideExtra::Origination {
                company_name: "Acme Payroll".to_string(),
                sec_code: "PPD".to_string(),
            }
        );
    }

    #[test]
    fn test_odfi_empty_descriptive_fields() {
        let mut entry = odfi_entry("2024-01-01T00:00:00+02:00");
        entry.company_name.clear();
        entry.sec_code.clear();

        let item = normalize_odfi(entry).unwrap();
        assert_eq!(item.company_name(), Some(""));
    }

    #[test]
    fn test_rdfi_return_reason_only_when_present() {
        let returned = normalize_rdfi(rdfi_entry(Some("R01"))).unwrap();
        assert_eq!(returned.return_reason(), Some("R01"));

        let blank = normalize_rdfi(rdfi_entry(Some(""))).unwrap();
        assert_eq!(blank.return_reason(), None);

        let absent = normalize_rdfi(rdfi_entry(None)).unwrap();
        assert_eq!(absent.return_reason(), None);
        assert_eq!(absent.receiver_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_invalid_created_at_is_parsing_error() {
        let err = normalize_odfi(odfi_entry("yesterday")).unwrap_err();
        assert!(matches!(err.root(), ServiceError::Parsing(_)));
        assert_eq!(err.service_name(), Some("odfi"));
        assert_eq!(err.context().and_then(|c| c.get("entry_id")), Some("o-1"));
    }

    #[test]
    fn test_normalize_all_fails_on_first_bad_record() {
        let entries = vec![odfi_entry("2024-01-01T00:00:00Z"), odfi_entry("")];
        assert!(normalize_all(entries, normalize_odfi).is_err());

        let entries = vec![odfi_entry("2024-01-01T00:00:00Z")];
        assert_eq!(normalize_all(entries, normalize_odfi).unwrap().len(), 1);
    }
}
