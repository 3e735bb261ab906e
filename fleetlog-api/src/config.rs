//! API Configuration Module
//!
//! Bind address, CORS, paging and the known fleet list. Loaded from
//! environment variables with development defaults.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Vehicles offered on a new form when `FLEETLOG_VEHICLES` is unset.
pub const DEFAULT_VEHICLES: &[&str] = &["2022 RAM", "2012 F250", "2016 AWD Equinox"];

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins. Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Forms
    // ========================================================================
    /// Records per page on the "my forms" listing.
    pub page_size: usize,

    /// Vehicle names offered on a new form.
    pub vehicles: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            page_size: 10,
            vehicles: DEFAULT_VEHICLES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FLEETLOG_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `FLEETLOG_API_PORT`: Listen port (default: 3000)
    /// - `FLEETLOG_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `FLEETLOG_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `FLEETLOG_PAGE_SIZE`: Records per page (default: 10)
    /// - `FLEETLOG_VEHICLES`: Comma-separated fleet list
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("FLEETLOG_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("FLEETLOG_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("FLEETLOG_CORS_ORIGINS")
            .ok()
            .map(|s| split_list(&s))
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("FLEETLOG_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let page_size = std::env::var("FLEETLOG_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.page_size);

        let vehicles = std::env::var("FLEETLOG_VEHICLES")
            .ok()
            .map(|s| split_list(&s))
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.vehicles);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            page_size,
            vehicles,
        })
    }

    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == origin)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
