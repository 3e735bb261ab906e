//! Trip Form REST API Routes
//!
//! The driver-facing side: start a form, save or submit it, read back and
//! list one's own records. Submitting starts the mileage audit in a background
//! task; audit trouble never fails the submission.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fleetlog_core::{format_mileage, RecordId, TripRecord, TripStatus};
use fleetlog_storage::{TripFilter, TripUpdate};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::metrics,
    types::{
        FormRequest, FormResponse, ListFormsQuery, ListFormsResponse, NewFormResponse, OwnerQuery,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/forms/new - Defaults for a blank form
#[utoipa::path(
    get,
    path = "/api/v1/forms/new",
    tag = "Forms",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Form defaults", body = NewFormResponse),
        (status = 400, description = "Missing email", body = ApiError),
    ),
)]
pub async fn new_form(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<impl IntoResponse> {
    let email = query.owner()?;
    let last_end_mileage = state
        .store
        .trip_latest_by_status(TripStatus::Submitted)?
        .and_then(|r| r.end_mileage);

    Ok(Json(NewFormResponse {
        email,
        last_end_mileage_display: last_end_mileage.as_deref().map(format_mileage),
        last_end_mileage,
        vehicles: state.config.vehicles.clone(),
    }))
}

/// POST /api/v1/forms - Create a trip record
#[utoipa::path(
    post,
    path = "/api/v1/forms",
    tag = "Forms",
    request_body = FormRequest,
    responses(
        (status = 201, description = "Record created", body = FormResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
)]
pub async fn create_form(
    State(state): State<AppState>,
    Json(req): Json<FormRequest>,
) -> ApiResult<impl IntoResponse> {
    let status = req.action.target_status();
    let form = req.to_form()?;
    let record = state.store.trip_create(form, status)?;

    tracing::info!(
        record_id = %record.id,
        vehicle = %record.vehicle_key(),
        status = %record.status,
        "Trip record created"
    );

    if record.is_submitted() {
        audit_submission(&state, record.id);
    }

    Ok((StatusCode::CREATED, Json(FormResponse { record })))
}

/// PUT /api/v1/forms/{id} - Update a draft owned by the caller
#[utoipa::path(
    put,
    path = "/api/v1/forms/{id}",
    tag = "Forms",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    request_body = FormRequest,
    responses(
        (status = 200, description = "Record updated", body = FormResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Record belongs to someone else", body = ApiError),
        (status = 404, description = "Record not found", body = ApiError),
        (status = 409, description = "Record already submitted", body = ApiError),
    ),
)]
pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FormRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = RecordId::new(id);
    let owner = req.owner()?;
    let existing = load_owned(&state, id, &owner)?;
    if existing.is_submitted() {
        return Err(ApiError::record_submitted(id));
    }

    let status = req.action.target_status();
    let form = req.to_form()?;
    let record = state.store.trip_update(id, TripUpdate::edit(form, status))?;

    tracing::info!(record_id = %id, status = %record.status, "Trip record updated");

    if record.is_submitted() {
        audit_submission(&state, id);
    }

    Ok(Json(FormResponse { record }))
}

/// GET /api/v1/forms/{id} - Read one of the caller's records
#[utoipa::path(
    get,
    path = "/api/v1/forms/{id}",
    tag = "Forms",
    params(
        ("id" = i64, Path, description = "Record ID"),
        OwnerQuery,
    ),
    responses(
        (status = 200, description = "Record details", body = FormResponse),
        (status = 403, description = "Record belongs to someone else", body = ApiError),
        (status = 404, description = "Record not found", body = ApiError),
    ),
)]
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<impl IntoResponse> {
    let owner = query.owner()?;
    let record = load_owned(&state, RecordId::new(id), &owner)?;
    Ok(Json(FormResponse { record }))
}

/// GET /api/v1/forms - The caller's records, submitted first, newest first
#[utoipa::path(
    get,
    path = "/api/v1/forms",
    tag = "Forms",
    params(ListFormsQuery),
    responses(
        (status = 200, description = "One page of records", body = ListFormsResponse),
        (status = 400, description = "Missing email", body = ApiError),
    ),
)]
pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<ListFormsQuery>,
) -> ApiResult<impl IntoResponse> {
    let owner = crate::types::normalize_email(query.email.as_deref().unwrap_or(""))?;
    let filter = TripFilter {
        email: Some(owner),
        ..TripFilter::default()
    };

    // trip_list is id descending; a stable sort keeps that within each status.
    let mut records = state.store.trip_list(&filter)?;
    records.sort_by_key(|r| std::cmp::Reverse(r.status.sort_rank()));

    Ok(Json(paginate(
        records,
        query.page.unwrap_or(1),
        state.config.page_size,
    )))
}

// ============================================================================
// HELPERS
// ============================================================================

fn load_owned(state: &AppState, id: RecordId, owner: &str) -> ApiResult<TripRecord> {
    let record = state
        .store
        .trip_get(id)?
        .ok_or_else(|| ApiError::record_not_found(id))?;
    if !record.is_owned_by(owner) {
        tracing::warn!(record_id = %id, "Record access denied for non-owner");
        return Err(ApiError::forbidden(format!(
            "Trip record {} belongs to another user",
            id
        )));
    }
    Ok(record)
}

/// Run the mileage audit for a freshly submitted record in the background.
///
/// The response does not wait for alert delivery, so a slow or unreachable
/// relay cannot hold up the submission.
pub(crate) fn audit_submission(state: &AppState, id: RecordId) {
    let auditor = state.auditor.clone();
    tokio::spawn(async move {
        let outcome = auditor.audit(id).await;
        metrics::record_audit(outcome.as_ref());
    });
}

/// Slice one 1-based page out of `records`. Page 0 is treated as page 1.
fn paginate(records: Vec<TripRecord>, page: usize, per_page: usize) -> ListFormsResponse {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = records.len();
    let pages = total.div_ceil(per_page);

    let forms = records
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    ListFormsResponse {
        forms,
        page,
        per_page,
        total,
        pages,
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::post(create_form))
        .route("/", axum::routing::get(list_forms))
        .route("/new", axum::routing::get(new_form))
        .route("/:id", axum::routing::get(get_form))
        .route("/:id", axum::routing::put(update_form))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fleetlog_core::TripForm;

    fn record(id: i64) -> TripRecord {
        let now = Utc.with_ymd_and_hms(2024, 5, 14, 16, 45, 0).unwrap();
        TripRecord::from_form(RecordId::new(id), TripForm::default(), TripStatus::Draft, now)
    }

    #[test]
    fn test_paginate_splits_pages() {
        let records: Vec<_> = (1..=23).rev().map(record).collect();

        let first = paginate(records.clone(), 1, 10);
        assert_eq!(first.total, 23);
        assert_eq!(first.pages, 3);
        assert_eq!(first.forms.len(), 10);
        assert_eq!(first.forms[0].id, RecordId::new(23));

        let last = paginate(records.clone(), 3, 10);
        assert_eq!(last.forms.len(), 3);
        assert_eq!(last.forms[2].id, RecordId::new(1));

        assert!(paginate(records, 9, 10).forms.is_empty());
    }

    #[test]
    fn test_paginate_page_zero_and_empty() {
        let page = paginate(vec![record(1)], 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.forms.len(), 1);

        let empty = paginate(Vec::new(), 1, 10);
        assert_eq!(empty.pages, 0);
        assert_eq!(empty.total, 0);
    }
}
