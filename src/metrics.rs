// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the multishare controller.
//!
//! This module provides metrics collection under the namespace prefix
//! `multishare_` covering placement decisions, eligibility classification,
//! and capacity-planner invocations, following the same registry/`LazyLock`
//! structure the teacher crate uses for its reconciliation metrics.
//!
//! # Example
//!
//! ```rust,no_run
//! use multishare_ctrl::metrics::record_placement_decision;
//!
//! record_placement_decision("place_on");
//! ```

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder, Encoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all multishare controller metrics.
const METRICS_NAMESPACE: &str = "multishare";

/// Global Prometheus metrics registry. All metrics are registered here and
/// exposed via the `/metrics` endpoint started by the demonstration binary.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of placement decisions by outcome (`place_on`,
/// `expand_then_place`, `create_instance`, `wait`).
pub static PLACEMENT_DECISIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_placement_decisions_total"),
        "Total number of placement decisions by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of a full placement decision in seconds.
pub static PLACEMENT_DECISION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_placement_decision_duration_seconds"),
        "Duration of a placement decision in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of instances classified by the eligibility engine, by
/// class (`ready`, `non_ready`, `ineligible`).
pub static ELIGIBILITY_CLASSIFICATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_eligibility_classifications_total"),
        "Total number of instances classified by the eligibility engine, by class",
    );
    let counter = CounterVec::new(opts, &["class"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of capacity-planner invocations that required expansion.
pub static CAPACITY_EXPANSIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_capacity_expansions_total"),
        "Total number of capacity-planner invocations by whether expansion was required",
    );
    let counter = CounterVec::new(opts, &["needed_expand"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of running operations observed in the most recent snapshot.
pub static RUNNING_OPS_SNAPSHOT_SIZE: LazyLock<prometheus::Gauge> = LazyLock::new(|| {
    let gauge = prometheus::Gauge::new(
        format!("{METRICS_NAMESPACE}_running_ops_snapshot_size"),
        "Number of non-done operations in the most recent operation-registry snapshot",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Record a placement decision outcome and its duration.
///
/// # Arguments
/// * `outcome` - one of `place_on`, `expand_then_place`, `create_instance`, `wait`
/// * `duration` - wall-clock time the decision took
pub fn record_placement_decision_timed(outcome: &str, duration: Duration) {
    PLACEMENT_DECISIONS_TOTAL.with_label_values(&[outcome]).inc();
    PLACEMENT_DECISION_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Record a placement decision outcome without timing information.
pub fn record_placement_decision(outcome: &str) {
    PLACEMENT_DECISIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record an eligibility classification outcome (`ready`, `non_ready`, or
/// `ineligible`).
pub fn record_eligibility_classification(class: &str) {
    ELIGIBILITY_CLASSIFICATIONS_TOTAL
        .with_label_values(&[class])
        .inc();
}

/// Record a capacity-planner invocation.
pub fn record_capacity_check(needed_expand: bool) {
    CAPACITY_EXPANSIONS_TOTAL
        .with_label_values(&[if needed_expand { "true" } else { "false" }])
        .inc();
}

/// Record the size of the most recent running-operations snapshot.
pub fn record_running_ops_snapshot(size: usize) {
    RUNNING_OPS_SNAPSHOT_SIZE.set(size as f64);
}

/// Gather and encode all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
