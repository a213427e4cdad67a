// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op metrics adapter for when metrics are disabled.

use super::{MetricLabels, MetricsAdapter};
use std::time::Duration;

/// Metrics adapter that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetricsAdapter;

impl NoOpMetricsAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsAdapter for NoOpMetricsAdapter {
    fn observe_duration(&self, _labels: &MetricLabels, _elapsed: Duration) {}

    fn increment_errors(&self, _labels: &MetricLabels) {}
}
