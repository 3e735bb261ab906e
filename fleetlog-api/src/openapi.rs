//! OpenAPI Specification for FLEETLOG API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{admin, forms, health};
use crate::telemetry::metrics;
use crate::types::*;

use fleetlog_core::{RecordId, TripForm, TripRecord, TripStatus};

/// OpenAPI document for FLEETLOG API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FLEETLOG API",
        version = "0.1.0",
        description = "Vehicle trip log with mileage consistency auditing",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Forms", description = "Trip form submission for drivers"),
        (name = "Admin", description = "Review, deletion and mileage audits"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        forms::new_form,
        forms::create_form,
        forms::update_form,
        forms::get_form,
        forms::list_forms,
        admin::list_forms,
        admin::update_form,
        admin::delete_form,
        admin::run_audit,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        RecordId,
        TripStatus,
        TripForm,
        TripRecord,
        FormAction,
        FormRequest,
        FormResponse,
        NewFormResponse,
        ListFormsResponse,
        AdminListResponse,
        AdminUpdateRequest,
        OverlapSummary,
        AuditRunResponse,
        health::HealthResponse,
        health::HealthStatus,
    ))
)]
pub struct ApiDoc;
