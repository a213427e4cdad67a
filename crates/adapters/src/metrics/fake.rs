// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake metrics adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MetricLabels, MetricsAdapter, Step};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded metrics call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsCall {
    Duration { labels: MetricLabels, elapsed: Duration },
    Error { labels: MetricLabels },
}

/// Fake metrics adapter for testing
#[derive(Clone, Default)]
pub struct FakeMetricsAdapter {
    calls: Arc<Mutex<Vec<MetricsCall>>>,
}

impl FakeMetricsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<MetricsCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of duration observations for `step`
    pub fn observed(&self, step: Step) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MetricsCall::Duration { labels, .. } if labels.step == step))
            .count()
    }

    /// Number of error increments for `step`
    pub fn errors(&self, step: Step) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MetricsCall::Error { labels } if labels.step == step))
            .count()
    }
}

impl MetricsAdapter for FakeMetricsAdapter {
    fn observe_duration(&self, labels: &MetricLabels, elapsed: Duration) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MetricsCall::Duration {
                labels: labels.clone(),
                elapsed,
            });
    }

    fn increment_errors(&self, labels: &MetricLabels) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MetricsCall::Error {
                labels: labels.clone(),
            });
    }
}
