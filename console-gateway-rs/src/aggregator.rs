//! Concurrent fan-out/fan-in over the entry sources
//!
//! Every selected source is queried at once. The aggregator waits for all of
//! them, turns each outcome into a [`ServiceHealth`] entry (in completion
//! order), merges the records of the sources that succeeded, then sorts and
//! pages the merge. A failing source never fails the aggregate call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ach_sdk::{EntryFilter, ErrorContext, OdfiClient, RdfiClient, ServiceError};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::models::{AggregationResponse, ServiceHealth, Side, UnifiedAchItem};
use crate::normalizer::{normalize_all, normalize_odfi, normalize_rdfi};
use crate::sorting::{paginate, sort_items, Page, SortSpec};

/// One backend that can list and fetch unified records
#[async_trait]
pub trait EntrySource: Send + Sync {
    fn side(&self) -> Side;

    /// Backend name reported in `service_info`
    fn name(&self) -> &str;

    async fn fetch(&self, filter: &EntryFilter) -> ach_sdk::Result<Vec<UnifiedAchItem>>;

    /// `Ok(None)` when the backend has no such record
    async fn fetch_one(&self, id: &str) -> ach_sdk::Result<Option<UnifiedAchItem>>;
}

/// ODFI entries through the ODFI client
pub struct OdfiSource {
    client: OdfiClient,
}

impl OdfiSource {
    pub fn new(client: OdfiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntrySource for OdfiSource {
    fn side(&self) -> Side {
        Side::Odfi
    }

    fn name(&self) -> &str {
        Side::Odfi.as_str()
    }

    async fn fetch(&self, filter: &EntryFilter) -> ach_sdk::Result<Vec<UnifiedAchItem>> {
        let entries = self.client.list_entries(filter).await?;
        normalize_all(entries, normalize_odfi)
    }

    async fn fetch_one(&self, id: &str) -> ach_sdk::Result<Option<UnifiedAchItem>> {
        self.client.get_entry(id).await?.map(normalize_odfi).transpose()
    }
}

/// RDFI entries through the RDFI client
pub struct RdfiSource {
    client: RdfiClient,
}

impl RdfiSource {
    pub fn new(client: RdfiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntrySource for RdfiSource {
    fn side(&self) -> Side {
        Side::Rdfi
    }

    fn name(&self) -> &str {
        Side::Rdfi.as_str()
    }

    async fn fetch(&self, filter: &EntryFilter) -> ach_sdk::Result<Vec<UnifiedAchItem>> {
        let entries = self.client.list_entries(filter).await?;
        normalize_all(entries, normalize_rdfi)
    }

    async fn fetch_one(&self, id: &str) -> ach_sdk::Result<Option<UnifiedAchItem>> {
        self.client.get_entry(id).await?.map(normalize_rdfi).transpose()
    }
}

/// Filters, ordering and page of one aggregate call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateQuery {
    /// `None` queries every source
    pub side: Option<Side>,
    pub filter: EntryFilter,
    pub sort: SortSpec,
    pub page: Page,
}

/// What one source produced for one request
#[derive(Debug)]
pub struct BackendOutcome {
    pub backend_name: String,
    pub result: ach_sdk::Result<Vec<UnifiedAchItem>>,
    pub latency: Duration,
}

impl BackendOutcome {
    pub fn health(&self) -> ServiceHealth {
        match &self.result {
            Ok(_) => ServiceHealth::up(self.backend_name.as_str(), self.latency),
            Err(err) => ServiceHealth::down(self.backend_name.as_str(), err.to_string(), self.latency),
        }
    }
}

pub struct Aggregator {
    sources: Vec<Arc<dyn EntrySource>>,
    deadline: Option<Duration>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn EntrySource>>) -> Self {
        Self {
            sources,
            deadline: None,
        }
    }

    /// ODFI and RDFI sources over the given clients
    pub fn from_clients(odfi: OdfiClient, rdfi: RdfiClient) -> Self {
        Self::new(vec![
            Arc::new(OdfiSource::new(odfi)),
            Arc::new(RdfiSource::new(rdfi)),
        ])
    }

    /// Bound every fan-out task by the same per-request deadline
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    fn select(&self, side: Option<Side>) -> Result<Vec<Arc<dyn EntrySource>>, GatewayError> {
        let selected: Vec<_> = self
            .sources
            .iter()
            .filter(|source| side.map_or(true, |s| source.side() == s))
            .cloned()
            .collect();

        match side {
            Some(s) if selected.is_empty() => Err(GatewayError::NoSourceForSide(s)),
            _ => Ok(selected),
        }
    }

    /// Query the selected sources concurrently and merge what came back
    pub async fn aggregate(&self, query: &AggregateQuery) -> Result<AggregationResponse, GatewayError> {
        let selected = self.select(query.side)?;
        let deadline = self.deadline.map(|d| Instant::now() + d);

        let mut pending: FuturesUnordered<_> = selected
            .into_iter()
            .map(|source| run_source(source, &query.filter, deadline))
            .collect();

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(outcome) = pending.next().await {
            outcomes.push(outcome);
        }

        let mut merged = Vec::new();
        let mut service_info = Vec::with_capacity(outcomes.len());
        let mut partial = false;

        for outcome in outcomes {
            service_info.push(outcome.health());
            match outcome.result {
                Ok(records) => {
                    info!(
                        backend = %outcome.backend_name,
                        records = records.len(),
                        latency = ?outcome.latency,
                        "Backend responded"
                    );
                    merged.extend(records);
                }
                Err(err) => {
                    partial = true;
                    warn!(
                        backend = %outcome.backend_name,
                        latency = ?outcome.latency,
                        context = ?err.context().map(|c| &c.data),
                        "Backend degraded: {}",
                        err
                    );
                }
            }
        }

        sort_items(&mut merged, query.sort);
        let total_count = merged.len();
        let items = paginate(merged, query.page);

        debug!(total_count, returned = items.len(), partial, "Aggregation complete");

        Ok(AggregationResponse {
            items,
            service_info,
            partial,
            total_count,
        })
    }

    /// Fetch one record from the source named by `side`
    ///
    /// An unrecognized side fails before any backend is contacted.
    pub async fn get_one(&self, side: &str, id: &str) -> Result<Option<UnifiedAchItem>, GatewayError> {
        let side: Side = side.parse()?;
        let source = self
            .sources
            .iter()
            .find(|source| source.side() == side)
            .ok_or(GatewayError::NoSourceForSide(side))?;

        let deadline = self.deadline.map(|d| Instant::now() + d);
        Ok(bounded(source.as_ref(), deadline, source.fetch_one(id)).await?)
    }
}

/// Run a source call, failing with a timeout once `deadline` passes
async fn bounded<T, F>(source: &dyn EntrySource, deadline: Option<Instant>, call: F) -> ach_sdk::Result<T>
where
    F: Future<Output = ach_sdk::Result<T>>,
{
    let Some(deadline) = deadline else {
        return call.await;
    };

    match tokio::time::timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::timeout(format!(
            "{} did not respond before the request deadline",
            source.name()
        ))
        .with_context(ErrorContext::for_service(source.side().source()))),
    }
}

async fn run_source(
    source: Arc<dyn EntrySource>,
    filter: &EntryFilter,
    deadline: Option<Instant>,
) -> BackendOutcome {
    let started = Instant::now();
    let result = bounded(source.as_ref(), deadline, source.fetch(filter)).await;

    BackendOutcome {
        backend_name: source.name().to_string(),
        result,
        latency: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::SideExtra;
    use crate::sorting::{SortField, SortOrder};

    enum Behavior {
        Records(Vec<UnifiedAchItem>),
        Fail(&'static str),
    }

    struct FakeSource {
        side: Side,
        delay: Duration,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn ok(side: Side, records: Vec<UnifiedAchItem>) -> Self {
            Self {
                side,
                delay: Duration::ZERO,
                behavior: Behavior::Records(records),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(side: Side, message: &'static str) -> Self {
            Self {
                side,
                delay: Duration::ZERO,
                behavior: Behavior::Fail(message),
                calls: AtomicUsize::new(0),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntrySource for FakeSource {
        fn side(&self) -> Side {
            self.side
        }

        fn name(&self) -> &str {
            self.side.as_str()
        }

        async fn fetch(&self, _filter: &EntryFilter) -> ach_sdk::Result<Vec<UnifiedAchItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.behavior {
                Behavior::Records(records) => Ok(records.clone()),
                Behavior::Fail(message) => Err(ServiceError::network(*message)),
            }
        }

        async fn fetch_one(&self, id: &str) -> ach_sdk::Result<Option<UnifiedAchItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.behavior {
                Behavior::Records(records) => {
                    Ok(records.iter().find(|r| r.entry_id == id).cloned())
                }
                Behavior::Fail(message) => Err(ServiceError::network(*message)),
            }
        }
    }

    fn odfi(id: &str, created_at: &str, amount: i64) -> UnifiedAchItem {
        UnifiedAchItem {
            side: Side::Odfi,
            source: "odfi".to_string(),
            entry_id: id.to_string(),
            trace_number: format!("0910000100{}", id),
            amount_cents: amount,
            status: "PENDING".to_string(),
            created_at: created_at.to_string(),
            extra: SideExtra::Origination {
                company_name: "Acme Payroll".to_string(),
                sec_code: "PPD".to_string(),
            },
        }
    }

    fn rdfi(id: &str, created_at: &str, amount: i64) -> UnifiedAchItem {
        UnifiedAchItem {
            side: Side::Rdfi,
            source: "rdfi".to_string(),
            entry_id: id.to_string(),
            trace_number: format!("0610000500{}", id),
            amount_cents: amount,
            status: "RECEIVED".to_string(),
            created_at: created_at.to_string(),
            extra: SideExtra::Receiving {
                receiver_name: "Jane Doe".to_string(),
                return_reason: None,
            },
        }
    }

    fn scenario_odfi() -> Vec<UnifiedAchItem> {
        vec![
            odfi("a1", "2024-01-01T00:00:00Z", 1000),
            odfi("a2", "2024-01-02T00:00:00Z", 2000),
        ]
    }

    fn scenario_rdfi() -> Vec<UnifiedAchItem> {
        vec![rdfi("b1", "2024-01-01T12:00:00Z", 500)]
    }

    fn aggregator(sources: Vec<Arc<FakeSource>>) -> Aggregator {
        Aggregator::new(
            sources
                .into_iter()
                .map(|s| s as Arc<dyn EntrySource>)
                .collect(),
        )
    }

    fn all_items() -> AggregateQuery {
        AggregateQuery {
            page: Page { limit: 0, offset: 0 },
            ..Default::default()
        }
    }

    fn ids(items: &[UnifiedAchItem]) -> Vec<&str> {
        items.iter().map(|i| i.entry_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_default_sort_first_page() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi())),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi())),
        ]);
        let query = AggregateQuery {
            page: Page { limit: 2, offset: 0 },
            ..Default::default()
        };

        let response = agg.aggregate(&query).await.unwrap();

        assert_eq!(ids(&response.items), vec!["a2", "b1"]);
        assert_eq!(response.total_count, 3);
        assert!(!response.partial);
        assert_eq!(response.service_info.len(), 2);
        assert!(response.service_info.iter().all(|h| h.available));
    }

    #[tokio::test]
    async fn test_merge_keeps_every_record_once() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi())),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi())),
        ]);

        let response = agg.aggregate(&all_items()).await.unwrap();

        let mut got = ids(&response.items);
        got.sort_unstable();
        assert_eq!(got, vec!["a1", "a2", "b1"]);
        assert_eq!(response.total_count, 3);
    }

    #[tokio::test]
    async fn test_one_backend_down_degrades() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi())),
            Arc::new(FakeSource::failing(Side::Rdfi, "connection refused")),
        ]);

        let response = agg.aggregate(&all_items()).await.unwrap();

        assert!(response.partial);
        assert_eq!(response.total_count, 2);
        assert!(response.items.iter().all(|i| i.side == Side::Odfi));

        let rdfi = response
            .service_info
            .iter()
            .find(|h| h.service == "RDFI")
            .unwrap();
        assert!(!rdfi.available);
        assert!(rdfi.error.as_deref().unwrap().contains("connection refused"));

        let odfi = response
            .service_info
            .iter()
            .find(|h| h.service == "ODFI")
            .unwrap();
        assert!(odfi.available);
        assert!(odfi.error.is_none());
    }

    #[tokio::test]
    async fn test_all_backends_down() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::failing(Side::Odfi, "timeout")),
            Arc::new(FakeSource::failing(Side::Rdfi, "503")),
        ]);

        let response = agg.aggregate(&all_items()).await.unwrap();

        assert!(response.items.is_empty());
        assert_eq!(response.total_count, 0);
        assert!(response.partial);
        assert_eq!(response.service_info.len(), 2);
        assert!(response.service_info.iter().all(|h| !h.available));
    }

    #[tokio::test]
    async fn test_service_info_in_completion_order() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()).delayed(Duration::from_millis(80))),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi())),
        ]);

        let response = agg.aggregate(&all_items()).await.unwrap();

        let order: Vec<&str> = response.service_info.iter().map(|h| h.service.as_str()).collect();
        assert_eq!(order, vec!["RDFI", "ODFI"]);
    }

    #[tokio::test]
    async fn test_fast_failure_does_not_cancel_slow_success() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()).delayed(Duration::from_millis(50))),
            Arc::new(FakeSource::failing(Side::Rdfi, "connection refused")),
        ]);

        let response = agg.aggregate(&all_items()).await.unwrap();

        assert_eq!(response.total_count, 2);
        assert!(response.partial);
    }

    #[tokio::test]
    async fn test_sources_run_concurrently() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()).delayed(Duration::from_millis(150))),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi()).delayed(Duration::from_millis(150))),
        ]);

        let started = std::time::Instant::now();
        agg.aggregate(&all_items()).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(290));
    }

    #[tokio::test]
    async fn test_deadline_degrades_slow_backend() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()).delayed(Duration::from_secs(5))),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi())),
        ])
        .with_deadline(Some(Duration::from_millis(50)));

        let response = agg.aggregate(&all_items()).await.unwrap();

        assert!(response.partial);
        assert_eq!(ids(&response.items), vec!["b1"]);
        let odfi = response
            .service_info
            .iter()
            .find(|h| h.service == "ODFI")
            .unwrap();
        assert!(odfi.error.as_deref().unwrap().starts_with("Timeout error"));
    }

    #[tokio::test]
    async fn test_deadline_bounds_get_one() {
        let agg = aggregator(vec![Arc::new(
            FakeSource::ok(Side::Odfi, scenario_odfi()).delayed(Duration::from_secs(5)),
        )])
        .with_deadline(Some(Duration::from_millis(50)));

        let started = Instant::now();
        let result = agg.get_one("ODFI", "a1").await;

        assert!(started.elapsed() < Duration::from_secs(5));
        match result {
            Err(GatewayError::Upstream(err)) => {
                assert!(matches!(err.root(), ServiceError::Timeout(_)));
                assert_eq!(err.service_name(), Some("odfi"));
            }
            other => panic!("expected an upstream timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_side_filter_queries_one_backend() {
        let odfi_source = Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()));
        let rdfi_source = Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi()));
        let agg = aggregator(vec![odfi_source.clone(), rdfi_source.clone()]);

        let query = AggregateQuery {
            side: Some(Side::Rdfi),
            ..all_items()
        };
        let response = agg.aggregate(&query).await.unwrap();

        assert_eq!(ids(&response.items), vec!["b1"]);
        assert_eq!(response.service_info.len(), 1);
        assert_eq!(odfi_source.calls(), 0);
        assert_eq!(rdfi_source.calls(), 1);
    }

    #[tokio::test]
    async fn test_side_without_source_is_contract_error() {
        let agg = aggregator(vec![Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()))]);

        let query = AggregateQuery {
            side: Some(Side::Rdfi),
            ..all_items()
        };
        assert!(matches!(
            agg.aggregate(&query).await,
            Err(GatewayError::NoSourceForSide(Side::Rdfi))
        ));
    }

    #[tokio::test]
    async fn test_offset_past_end() {
        let agg = aggregator(vec![
            Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi())),
            Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi())),
        ]);
        let query = AggregateQuery {
            page: Page { limit: 10, offset: 7 },
            ..Default::default()
        };

        let response = agg.aggregate(&query).await.unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total_count, 3);
    }

    #[tokio::test]
    async fn test_equal_amounts_keep_completion_order() {
        let agg = aggregator(vec![
            Arc::new(
                FakeSource::ok(Side::Odfi, vec![odfi("a1", "2024-01-01T00:00:00Z", 700)])
                    .delayed(Duration::from_millis(60)),
            ),
            Arc::new(FakeSource::ok(Side::Rdfi, vec![rdfi("b1", "2024-01-03T00:00:00Z", 700)])),
        ]);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = AggregateQuery {
                sort: SortSpec::new(SortField::AmountCents, order),
                ..all_items()
            };
            let response = agg.aggregate(&query).await.unwrap();
            assert_eq!(ids(&response.items), vec!["b1", "a1"]);
        }
    }

    #[tokio::test]
    async fn test_get_one_dispatches_to_named_side() {
        let odfi_source = Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()));
        let rdfi_source = Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi()));
        let agg = aggregator(vec![odfi_source.clone(), rdfi_source.clone()]);

        let item = agg.get_one("ORIGIN", "a1").await.unwrap().unwrap();
        assert_eq!(item.entry_id, "a1");
        assert_eq!(odfi_source.calls(), 1);
        assert_eq!(rdfi_source.calls(), 0);

        assert!(agg.get_one("odfi", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_one_unknown_side_contacts_nothing() {
        let odfi_source = Arc::new(FakeSource::ok(Side::Odfi, scenario_odfi()));
        let rdfi_source = Arc::new(FakeSource::ok(Side::Rdfi, scenario_rdfi()));
        let agg = aggregator(vec![odfi_source.clone(), rdfi_source.clone()]);

        let result = agg.get_one("UNKNOWN", "a1").await;

        assert!(matches!(result, Err(GatewayError::InvalidSide(_))));
        assert_eq!(odfi_source.calls() + rdfi_source.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_one_backend_failure_is_upstream() {
        let agg = aggregator(vec![Arc::new(FakeSource::failing(Side::Rdfi, "connection refused"))]);

        assert!(matches!(
            agg.get_one("RDFI", "b1").await,
            Err(GatewayError::Upstream(_))
        ));
    }
}
