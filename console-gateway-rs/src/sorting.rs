//! Ordering and paging of merged records

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::UnifiedAchItem;
use crate::validation::ApiValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Status,
    AmountCents,
    TraceNumber,
    Side,
}

impl FromStr for SortField {
    type Err = ApiValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" => Ok(SortField::CreatedAt),
            "status" => Ok(SortField::Status),
            "amount" | "amount_cents" => Ok(SortField::AmountCents),
            "trace_number" => Ok(SortField::TraceNumber),
            "side" => Ok(SortField::Side),
            _ => Err(ApiValidationError::InvalidParameter {
                field: "sort_by",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ApiValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ApiValidationError::InvalidParameter {
                field: "sort_order",
                value: s.to_string(),
            }),
        }
    }
}

/// Requested ordering; newest first by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Compare two records on the raw value of one field
fn compare_by(field: SortField, a: &UnifiedAchItem, b: &UnifiedAchItem) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Status => a.status.cmp(&b.status),
        SortField::AmountCents => a.amount_cents.cmp(&b.amount_cents),
        SortField::TraceNumber => a.trace_number.cmp(&b.trace_number),
        SortField::Side => a.side.as_str().cmp(b.side.as_str()),
    }
}

/// Stable sort: equal keys keep their incoming order in both directions
pub fn sort_items(items: &mut [UnifiedAchItem], spec: SortSpec) {
    items.sort_by(|a, b| {
        let ord = compare_by(spec.field, a, b);
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Offset/limit slice; a zero limit means "everything from offset"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    /// Half-open `[start, end)` bounds for a set of `total` records
    pub fn bounds(&self, total: usize) -> (usize, usize) {
        let start = self.offset.min(total);
        let end = if self.limit == 0 || start.saturating_add(self.limit) > total {
            total
        } else {
            start + self.limit
        };
        (start, end)
    }
}

/// Take one page out of a sorted set; out-of-range offsets give an empty page
pub fn paginate<T>(mut items: Vec<T>, page: Page) -> Vec<T> {
    let (start, end) = page.bounds(items.len());
    items.truncate(end);
    items.drain(..start);
    items
}
