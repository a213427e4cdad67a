// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics emitted as structured log events

use super::{MetricLabels, MetricsAdapter};
use std::time::Duration;

/// Target for metric events, so they can be filtered or routed separately
pub const METRICS_TARGET: &str = "bx::metrics";

/// Writes each measurement as a tracing event under [`METRICS_TARGET`].
///
/// A collector scraping the daemon log can rebuild the request-duration
/// histogram and error counter from these events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMetricsAdapter;

impl LogMetricsAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsAdapter for LogMetricsAdapter {
    fn observe_duration(&self, labels: &MetricLabels, elapsed: Duration) {
        tracing::info!(
            target: METRICS_TARGET,
            metric = "request_duration_seconds",
            step = labels.step.as_str(),
            blueprint_name = %labels.blueprint_name,
            blueprint_version = %labels.blueprint_version,
            script = labels.script.as_deref().unwrap_or(""),
            seconds = elapsed.as_secs_f64(),
        );
    }

    fn increment_errors(&self, labels: &MetricLabels) {
        tracing::info!(
            target: METRICS_TARGET,
            metric = "request_errors_total",
            step = labels.step.as_str(),
            blueprint_name = %labels.blueprint_name,
            blueprint_version = %labels.blueprint_version,
            script = labels.script.as_deref().unwrap_or(""),
        );
    }
}
