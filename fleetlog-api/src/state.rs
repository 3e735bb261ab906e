//! Shared application state.

use std::sync::Arc;

use fleetlog_audit::{MileageAuditor, Notifier};
use fleetlog_core::AuditConfig;
use fleetlog_storage::TripStore;

use crate::config::ApiConfig;

/// Handles shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TripStore>,
    pub auditor: MileageAuditor,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TripStore>,
        notifier: Arc<dyn Notifier>,
        audit_config: AuditConfig,
        api_config: ApiConfig,
    ) -> Self {
        let auditor = MileageAuditor::new(store.clone(), notifier, audit_config);
        Self {
            store,
            auditor,
            config: Arc::new(api_config),
        }
    }
}
