// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Prometheus metrics for tag I/O.
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `taglink_reads_total` | Counter | Item reads by status |
//! | `taglink_read_duration_seconds` | Histogram | Item read latency |
//! | `taglink_writes_total` | Counter | Item writes by status |
//! | `taglink_heals_total` | Counter | Completed reconnections |
//! | `taglink_subscribed_tags` | Gauge | Tags in the registry |

use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_counter, register_counter_vec, register_gauge,
    register_histogram, Counter, CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};

// =============================================================================
// Metric Definitions
// =============================================================================

static READS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "taglink_reads_total",
        "Total number of item reads by status",
        &["status"]
    )
    .expect("Failed to register reads_total metric")
});

/// Buckets from 1us up to 100ms in decades.
static READ_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "taglink_read_duration_seconds",
        "Duration of item reads in seconds",
        exponential_buckets(0.000001, 10.0, 6).expect("Invalid read duration buckets")
    )
    .expect("Failed to register read_duration metric")
});

static WRITES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "taglink_writes_total",
        "Total number of item writes by status",
        &["status"]
    )
    .expect("Failed to register writes_total metric")
});

static HEALS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "taglink_heals_total",
        "Total number of completed reconnections"
    )
    .expect("Failed to register heals_total metric")
});

static SUBSCRIBED_TAGS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("taglink_subscribed_tags", "Number of subscribed tags")
        .expect("Failed to register subscribed_tags metric")
});

// =============================================================================
// Metrics Collector
// =============================================================================

/// Records tag I/O metrics into the default registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMetricsCollector {
    enabled: bool,
}

impl TagMetricsCollector {
    /// Creates a collector.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Creates a no-op collector.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Returns whether metrics collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records one item read.
    pub fn record_read(&self, success: bool, duration_secs: f64) {
        if !self.enabled {
            return;
        }
        READS_TOTAL.with_label_values(&[status(success)]).inc();
        READ_DURATION.observe(duration_secs);
    }

    /// Records one item write.
    pub fn record_write(&self, success: bool) {
        if !self.enabled {
            return;
        }
        WRITES_TOTAL.with_label_values(&[status(success)]).inc();
    }

    /// Records a completed reconnection.
    pub fn record_heal(&self) {
        if !self.enabled {
            return;
        }
        HEALS_TOTAL.inc();
    }

    /// Updates the subscribed tag gauge.
    pub fn set_subscribed(&self, count: usize) {
        if !self.enabled {
            return;
        }
        SUBSCRIBED_TAGS.set(count as f64);
    }
}

fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::warn!(error = %e, "Metric encoding failed");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================
