use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Boundary Metrics
    pub static ref BOUNDARY_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "boundary_failures_total",
        "Downstream failures converted into 500 responses",
        &["kind"]  // kind: error, panic
    )
    .unwrap();

    // Origin Metrics
    pub static ref ORIGIN_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "origin_requests_total",
        "Requests forwarded to the origin",
        &["result"]  // result: ok, error
    )
    .unwrap();
}

/// Force registration of every metric so they show up before first use
pub fn init_metrics() {
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&BOUNDARY_FAILURES_TOTAL);
    lazy_static::initialize(&ORIGIN_REQUESTS_TOTAL);
}
