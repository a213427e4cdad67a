// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request metrics adapters

mod event;
mod noop;

pub use event::{LogMetricsAdapter, METRICS_TARGET};
pub use noop::NoOpMetricsAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMetricsAdapter, MetricsCall};

use bx_core::BlueprintIdentity;
use std::fmt;
use std::time::Duration;

/// Executor operation a measurement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Upload,
    Prepare,
    Execute,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Upload => "upload_cba",
            Step::Prepare => "prepare_env",
            Step::Execute => "execute_command",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels attached to every measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    pub step: Step,
    pub blueprint_name: String,
    pub blueprint_version: String,
    /// Script name, for executions only
    pub script: Option<String>,
}

impl MetricLabels {
    pub fn new(step: Step, identity: &BlueprintIdentity) -> Self {
        Self {
            step,
            blueprint_name: identity.name.clone(),
            blueprint_version: identity.version.clone(),
            script: None,
        }
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

/// Sink for per-request timings and failure counts
pub trait MetricsAdapter: Clone + Send + Sync + 'static {
    /// Record how long one request took
    fn observe_duration(&self, labels: &MetricLabels, elapsed: Duration);

    /// Count a failed request
    fn increment_errors(&self, labels: &MetricLabels);
}
