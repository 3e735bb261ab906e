//! Admin Review REST API Routes
//!
//! Filtered listing, review comments, deletion and on-demand mileage audits.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fleetlog_audit::{AuditOutcome, SkipReason};
use fleetlog_core::{parse_date_or_none, RecordId, TripStatus};
use fleetlog_storage::{TripFilter, TripUpdate};

use crate::{
    error::{ApiError, ApiResult},
    routes::forms::audit_submission,
    state::AppState,
    telemetry::metrics,
    types::{
        AdminListQuery, AdminListResponse, AdminUpdateRequest, AuditRunResponse, FormResponse,
        OverlapSummary,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/admin/forms - Filtered listing, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/forms",
    tag = "Admin",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Matching records", body = AdminListResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
    ),
)]
pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = build_filter(&query)?;
    let forms = state.store.trip_list(&filter)?;
    let total = forms.len();
    Ok(Json(AdminListResponse { forms, total }))
}

/// PATCH /api/v1/admin/forms/{id} - Record a review comment or status
///
/// Moving a draft to submitted starts the mileage audit.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/forms/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    request_body = AdminUpdateRequest,
    responses(
        (status = 200, description = "Record updated", body = FormResponse),
        (status = 404, description = "Record not found", body = ApiError),
        (status = 409, description = "Submitted records cannot return to draft", body = ApiError),
    ),
)]
pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = RecordId::new(id);
    let was_submitted = state
        .store
        .trip_get(id)?
        .ok_or_else(|| ApiError::record_not_found(id))?
        .is_submitted();

    let update = TripUpdate {
        form: None,
        status: req.status,
        admin_comment: req.admin_comment,
    };
    let record = state.store.trip_update(id, update)?;

    tracing::info!(record_id = %id, status = %record.status, "Admin review saved");

    // Promotion to submitted is audited like a driver submission.
    if !was_submitted && record.is_submitted() {
        audit_submission(&state, id);
    }

    Ok(Json(FormResponse { record }))
}

/// DELETE /api/v1/admin/forms/{id} - Delete a record
#[utoipa::path(
    delete,
    path = "/api/v1/admin/forms/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found", body = ApiError),
    ),
)]
pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let id = RecordId::new(id);
    state.store.trip_delete(id)?;
    tracing::info!(record_id = %id, "Trip record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/forms/{id}/audit - Re-run the mileage audit
#[utoipa::path(
    post,
    path = "/api/v1/admin/forms/{id}/audit",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Audit result", body = AuditRunResponse),
        (status = 404, description = "Record not found", body = ApiError),
        (status = 500, description = "Audit could not read the record store", body = ApiError),
    ),
)]
pub async fn run_audit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = RecordId::new(id);
    let outcome = match state.auditor.run(id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::record_audit(None);
            return Err(e.into());
        }
    };
    metrics::record_audit(Some(&outcome));

    if outcome == AuditOutcome::Skipped(SkipReason::NotFound) {
        return Err(ApiError::record_not_found(id));
    }

    Ok(Json(audit_response(id, &outcome)))
}

// ============================================================================
// HELPERS
// ============================================================================

fn build_filter(query: &AdminListQuery) -> ApiResult<TripFilter> {
    let status = match non_blank(&query.status) {
        Some(raw) => Some(raw.parse::<TripStatus>().map_err(|_| {
            ApiError::invalid_input(format!(
                "Unknown status '{}', expected draft or submitted",
                raw
            ))
        })?),
        None => None,
    };

    Ok(TripFilter {
        vehicle: non_blank(&query.vehicle),
        status,
        email: non_blank(&query.email),
        name: non_blank(&query.name),
        project: non_blank(&query.project),
        purpose: non_blank(&query.purpose),
        dep_date_from: filter_date("dep_from", query.dep_from.as_deref())?,
        dep_date_to: filter_date("dep_to", query.dep_to.as_deref())?,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn filter_date(field: &str, value: Option<&str>) -> ApiResult<Option<chrono::NaiveDate>> {
    parse_date_or_none(value).map_err(|_| ApiError::invalid_format(field, "YYYY-MM-DD"))
}

fn audit_response(id: RecordId, outcome: &AuditOutcome) -> AuditRunResponse {
    let skip_reason = match outcome {
        AuditOutcome::Skipped(reason) => Some(reason.as_str().to_string()),
        _ => None,
    };
    let report = outcome.report();

    AuditRunResponse {
        record_id: id,
        outcome: metrics::outcome_label(Some(outcome)).to_string(),
        skip_reason,
        issues: report.map(|r| r.issue_messages()).unwrap_or_default(),
        overlaps: report
            .map(|r| {
                r.overlaps
                    .iter()
                    .map(|c| OverlapSummary {
                        id: c.id,
                        name: c.name.clone(),
                        start_mileage: c.range.start,
                        end_mileage: c.range.end,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        gap: report.and_then(|r| r.gap),
        alert_sent: outcome.alert_sent(),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(list_forms))
        .route("/:id", axum::routing::patch(update_form))
        .route("/:id", axum::routing::delete(delete_form))
        .route("/:id/audit", axum::routing::post(run_audit))
        .with_state(state)
}
