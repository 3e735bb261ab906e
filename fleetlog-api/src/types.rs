//! Request and response bodies for the REST API.

use fleetlog_core::{parse_date_or_none, RecordId, TripForm, TripRecord, TripStatus, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// FORM SUBMISSION
// ============================================================================

/// What the user asked to do with the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormAction {
    /// Keep as an editable draft
    Save,
    /// Finalize and run the mileage audit
    #[default]
    Submit,
}

impl FormAction {
    pub fn target_status(self) -> TripStatus {
        match self {
            FormAction::Save => TripStatus::Draft,
            FormAction::Submit => TripStatus::Submitted,
        }
    }
}

/// Body for creating or updating a trip form.
///
/// Dates are `YYYY-MM-DD`; blank dates are stored as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FormRequest {
    /// Acting user's email; owns the record
    pub email: String,
    pub action: FormAction,
    pub name: String,
    pub phone: String,
    pub vehicle: String,
    pub dep_date: Option<String>,
    pub ret_date: Option<String>,
    pub start_mileage: Option<String>,
    pub end_mileage: Option<String>,
    pub destination: String,
    pub purpose: String,
    pub project: String,
    pub comments: String,
}

impl FormRequest {
    /// Owner email, trimmed and lowercased.
    pub fn owner(&self) -> ApiResult<String> {
        normalize_email(&self.email)
    }

    /// Convert into a storable form, parsing both dates.
    pub fn to_form(&self) -> ApiResult<TripForm> {
        Ok(TripForm {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.owner()?,
            vehicle: self.vehicle.clone(),
            dep_date: parse_form_date("dep_date", self.dep_date.as_deref())?,
            ret_date: parse_form_date("ret_date", self.ret_date.as_deref())?,
            start_mileage: self.start_mileage.clone(),
            end_mileage: self.end_mileage.clone(),
            destination: self.destination.clone(),
            purpose: self.purpose.clone(),
            project: self.project.clone(),
            comments: self.comments.clone(),
        })
    }
}

fn parse_form_date(field: &str, value: Option<&str>) -> ApiResult<Option<chrono::NaiveDate>> {
    parse_date_or_none(value).map_err(|e| match e {
        ValidationError::InvalidValue { reason, .. } => ValidationError::InvalidValue {
            field: field.to_string(),
            reason,
        }
        .into(),
        other => other.into(),
    })
}

pub(crate) fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "email".to_string(),
        }
        .into());
    }
    Ok(email)
}

/// Acting user for read endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

impl OwnerQuery {
    pub fn owner(&self) -> ApiResult<String> {
        normalize_email(self.email.as_deref().unwrap_or(""))
    }
}

/// Defaults for a blank form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewFormResponse {
    pub email: String,
    /// End mileage of the most recent submitted record across the fleet
    pub last_end_mileage: Option<String>,
    /// Same value with thousands separators
    pub last_end_mileage_display: Option<String>,
    pub vehicles: Vec<String>,
}

/// Response to a create or update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormResponse {
    pub record: TripRecord,
}

// ============================================================================
// LISTINGS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFormsQuery {
    pub email: Option<String>,
    /// 1-based page number
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListFormsResponse {
    pub forms: Vec<TripRecord>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    pub vehicle: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub project: Option<String>,
    pub purpose: Option<String>,
    /// Earliest departure date, `YYYY-MM-DD`
    pub dep_from: Option<String>,
    /// Latest departure date, `YYYY-MM-DD`
    pub dep_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminListResponse {
    pub forms: Vec<TripRecord>,
    pub total: usize,
}

// ============================================================================
// ADMIN REVIEW
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateRequest {
    pub admin_comment: Option<String>,
    pub status: Option<TripStatus>,
}

/// One overlapping record listed in an audit response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverlapSummary {
    pub id: RecordId,
    pub name: String,
    pub start_mileage: i64,
    pub end_mileage: i64,
}

/// Result of an on-demand audit run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditRunResponse {
    pub record_id: RecordId,
    /// `skipped`, `clean`, `alerted`, `alert_not_configured` or `alert_failed`
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    pub issues: Vec<String>,
    pub overlaps: Vec<OverlapSummary>,
    pub gap: Option<i64>,
    pub alert_sent: bool,
}
