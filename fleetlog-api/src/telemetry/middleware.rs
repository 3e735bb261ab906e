//! Axum middleware recording per-request metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;

use super::metrics::METRICS;

static NUMERIC_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Replace numeric path segments with `{id}` to keep label cardinality low.
pub fn normalize_path(path: &str) -> String {
    match NUMERIC_SEGMENT.as_ref() {
        // Applied twice so adjacent ids ("/1/2") both match.
        Some(re) => {
            let once = re.replace_all(path, "/{id}$1");
            re.replace_all(&once, "/{id}$1").into_owned()
        }
        None => path.to_string(),
    }
}

/// Count every request by method, normalized path and status.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let response = next.run(request).await;
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(method.as_str(), &normalized_path, status.as_u16());
    }

    tracing::debug!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(normalize_path("/api/v1/forms/12345"), "/api/v1/forms/{id}");
    }

    #[test]
    fn test_normalize_path_nested() {
        assert_eq!(
            normalize_path("/api/v1/admin/forms/42/audit"),
            "/api/v1/admin/forms/{id}/audit"
        );
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/forms"), "/api/v1/forms");
        assert_eq!(normalize_path("/health/ping"), "/health/ping");
    }
}
