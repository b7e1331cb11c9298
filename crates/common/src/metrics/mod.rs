//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions for the
//! resolution tiers, the external source, the cache layers, and the
//! traversal engine.

use crate::errors::{AppError, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;

/// Metrics prefix for all PaperGraph metrics
pub const METRICS_PREFIX: &str = "papergraph";

/// Histogram buckets for traversal and outline latency (in seconds)
///
/// A full-depth traversal fans out into dozens of upstream calls, so the
/// range runs much longer than a typical request histogram.
pub const DURATION_BUCKETS: &[f64] = &[
    0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.00, 30.00, 60.00, 120.0,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_papers_resolved_total", METRICS_PREFIX),
        Unit::Count,
        "Papers resolved, labeled by resolution tier"
    );

    describe_counter!(
        format!("{}_source_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Requests issued to the arXiv export API, counting retries"
    );

    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Cache hits, labeled by cache"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Cache misses, labeled by cache"
    );

    describe_histogram!(
        format!("{}_traversal_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Network discovery latency in seconds"
    );

    describe_counter!(
        format!("{}_traversal_nodes_total", METRICS_PREFIX),
        Unit::Count,
        "Nodes resolved by network discovery"
    );

    describe_counter!(
        format!("{}_traversal_links_total", METRICS_PREFIX),
        Unit::Count,
        "Edges recorded by network discovery"
    );

    describe_histogram!(
        format!("{}_outline_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Outline generation latency in seconds"
    );
}

/// Install the Prometheus exporter on the given port
pub fn init_prometheus(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .map_err(|e| AppError::Configuration {
            message: format!("invalid metrics buckets: {e}"),
        })?
        .install()
        .map_err(|e| AppError::Configuration {
            message: format!("failed to install metrics exporter: {e}"),
        })
}

/// Count a paper resolution, labeled by which tier satisfied it
pub fn record_resolution(tier: &'static str) {
    counter!(format!("{}_papers_resolved_total", METRICS_PREFIX), "tier" => tier).increment(1);
}

/// Count one request against the external source
pub fn record_source_request() {
    counter!(format!("{}_source_requests_total", METRICS_PREFIX)).increment(1);
}

pub fn record_cache_hit(cache: &'static str) {
    counter!(format!("{}_cache_hits_total", METRICS_PREFIX), "cache" => cache).increment(1);
}

pub fn record_cache_miss(cache: &'static str) {
    counter!(format!("{}_cache_misses_total", METRICS_PREFIX), "cache" => cache).increment(1);
}

/// Record a completed traversal
pub fn record_traversal(duration_secs: f64, nodes: usize, links: usize) {
    histogram!(format!("{}_traversal_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    counter!(format!("{}_traversal_nodes_total", METRICS_PREFIX)).increment(nodes as u64);
    counter!(format!("{}_traversal_links_total", METRICS_PREFIX)).increment(links as u64);
}

/// Record a completed outline generation
pub fn record_outline(duration_secs: f64) {
    histogram!(format!("{}_outline_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}
