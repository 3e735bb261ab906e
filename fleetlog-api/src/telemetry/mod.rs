//! FLEETLOG Telemetry - Observability Infrastructure
//!
//! Structured logging through `tracing` and Prometheus counters for the API
//! layer. Nothing here needs an external collector.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, FleetlogMetrics, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
