use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "portfolio_http_requests_total",
        "Total HTTP requests handled, by service and status class",
        &["service", "status"]
    )
    .expect("register http_requests_total")
});

pub static CACHE_LOOKUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "portfolio_cache_lookups_total",
        "Cache lookups by outcome (hit, miss, error)",
        &["outcome"]
    )
    .expect("register cache_lookups_total")
});

pub static EVENTS_PUBLISHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "portfolio_events_published_total",
        "Domain events handed to the publisher, by event type and result",
        &["event_type", "result"]
    )
    .expect("register events_published_total")
});

pub fn record_http(service: &str, status: u16) {
    let class = match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    };
    HTTP_REQUESTS_TOTAL.with_label_values(&[service, class]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_output() {
        record_http("test-svc", 204);
        CACHE_LOOKUPS_TOTAL.with_label_values(&["hit"]).inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("portfolio_http_requests_total"));
        assert!(body.contains("test-svc"));
    }
}
