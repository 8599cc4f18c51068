//! HTTP handlers
//!
//! `ach-items` routes go through the aggregator; the per-service routes map
//! one request to one backend call.

use std::sync::Arc;

use ach_sdk::eip::{CaseFilter, CreateCaseRequest, EipCase, UpdateCaseStatusRequest};
use ach_sdk::ledger::{BalanceResponse, CreatePostingRequest, LedgerPosting, PostingFilter};
use ach_sdk::odfi::{CreateOdfiEntryRequest, OdfiEntry, UpdateStatusRequest};
use ach_sdk::rdfi::{CreateRdfiEntryRequest, RdfiEntry, ReturnRequest};
use ach_sdk::EntryFilter;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::{AggregationResponse, Side, UnifiedAchItem};
use crate::normalizer::normalize_rdfi;
use crate::validation::{require_non_empty, AchItemsParams, ApiValidationError};
use crate::AppState;

type ApiResult<T> = Result<T, GatewayError>;
type Created<T> = (StatusCode, Json<T>);

/// Optional `status` / `trace_number` filters of the entry list routes
#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    pub status: Option<String>,
    pub trace_number: Option<String>,
}

impl From<EntryListParams> for EntryFilter {
    fn from(params: EntryListParams) -> Self {
        EntryFilter {
            status: params.status,
            trace_number: params.trace_number,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PostingListParams {
    pub ach_side: Option<String>,
    pub trace_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseListParams {
    pub status: Option<String>,
    pub side: Option<String>,
    pub trace_number: Option<String>,
}

/// Unwrap a JSON body, turning extractor rejections into 400 responses
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiValidationError::InvalidFormat(rejection.body_text()).into())
}

fn found<T>(record: Option<T>, what: impl FnOnce() -> String) -> ApiResult<Json<T>> {
    record.map(Json).ok_or_else(|| GatewayError::NotFound(what()))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn list_ach_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AchItemsParams>,
) -> ApiResult<Json<AggregationResponse>> {
    let query = params.into_query(state.limits)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("aggregate", request_id = %request_id, side = ?query.side);
    let response = state.aggregator.aggregate(&query).instrument(span).await?;

    Ok(Json(response))
}

pub async fn get_ach_item(
    State(state): State<Arc<AppState>>,
    Path((side, id)): Path<(String, String)>,
) -> ApiResult<Json<UnifiedAchItem>> {
    let item = state.aggregator.get_one(&side, &id).await?;
    found(item, || format!("{} entry {}", side.to_uppercase(), id))
}

pub async fn return_ach_item(
    State(state): State<Arc<AppState>>,
    Path((side, id)): Path<(String, String)>,
    payload: Result<Json<ReturnRequest>, JsonRejection>,
) -> ApiResult<Json<UnifiedAchItem>> {
    if side.parse::<Side>()? != Side::Rdfi {
        return Err(ApiValidationError::InvalidFormat(
            "returns are only supported for RDFI entries".to_string(),
        )
        .into());
    }

    let request = body(payload)?;
    require_non_empty("reason", &request.reason)?;

    let entry = state.rdfi.return_entry(&id, &request.reason).await?;
    let item = entry.map(normalize_rdfi).transpose()?;
    found(item, || format!("RDFI entry {}", id))
}

pub async fn create_odfi_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOdfiEntryRequest>, JsonRejection>,
) -> ApiResult<Created<OdfiEntry>> {
    let request = body(payload)?;
    let entry = state.odfi.create_entry(&request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_odfi_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EntryListParams>,
) -> ApiResult<Json<Vec<OdfiEntry>>> {
    let entries = state.odfi.list_entries(&params.into()).await?;
    Ok(Json(entries))
}

pub async fn get_odfi_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OdfiEntry>> {
    let entry = state.odfi.get_entry(&id).await?;
    found(entry, || format!("ODFI entry {}", id))
}

pub async fn update_odfi_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<OdfiEntry>> {
    let request = body(payload)?;
    require_non_empty("status", &request.status)?;

    let entry = state.odfi.update_status(&id, &request.status).await?;
    found(entry, || format!("ODFI entry {}", id))
}

pub async fn create_rdfi_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRdfiEntryRequest>, JsonRejection>,
) -> ApiResult<Created<RdfiEntry>> {
    let request = body(payload)?;
    let entry = state.rdfi.create_entry(&request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_rdfi_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EntryListParams>,
) -> ApiResult<Json<Vec<RdfiEntry>>> {
    let entries = state.rdfi.list_entries(&params.into()).await?;
    Ok(Json(entries))
}

pub async fn get_rdfi_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<RdfiEntry>> {
    let entry = state.rdfi.get_entry(&id).await?;
    found(entry, || format!("RDFI entry {}", id))
}

pub async fn return_rdfi_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ReturnRequest>, JsonRejection>,
) -> ApiResult<Json<RdfiEntry>> {
    let request = body(payload)?;
    require_non_empty("reason", &request.reason)?;

    let entry = state.rdfi.return_entry(&id, &request.reason).await?;
    found(entry, || format!("RDFI entry {}", id))
}

pub async fn create_posting(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePostingRequest>, JsonRejection>,
) -> ApiResult<Created<LedgerPosting>> {
    let request = body(payload)?;
    let posting = state.ledger.create_posting(&request).await?;
    Ok((StatusCode::CREATED, Json(posting)))
}

pub async fn list_postings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostingListParams>,
) -> ApiResult<Json<Vec<LedgerPosting>>> {
    let filter = PostingFilter {
        ach_side: params.ach_side,
        trace_number: params.trace_number,
    };
    let postings = state.ledger.list_postings(&filter).await?;
    Ok(Json(postings))
}

pub async fn get_balances(State(state): State<Arc<AppState>>) -> ApiResult<Json<BalanceResponse>> {
    Ok(Json(state.ledger.balances().await?))
}

pub async fn create_case(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCaseRequest>, JsonRejection>,
) -> ApiResult<Created<EipCase>> {
    let request = body(payload)?;
    let case = state.eip.create_case(&request).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn list_cases(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CaseListParams>,
) -> ApiResult<Json<Vec<EipCase>>> {
    let filter = CaseFilter {
        status: params.status,
        side: params.side,
        trace_number: params.trace_number,
    };
    let cases = state.eip.list_cases(&filter).await?;
    Ok(Json(cases))
}

pub async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<EipCase>> {
    let case = state.eip.get_case(&id).await?;
    found(case, || format!("EIP case {}", id))
}

pub async fn update_case_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCaseStatusRequest>, JsonRejection>,
) -> ApiResult<Json<EipCase>> {
    let request = body(payload)?;
    require_non_empty("status", &request.status)?;

    let case = state.eip.update_status(&id, &request.status).await?;
    found(case, || format!("EIP case {}", id))
}
