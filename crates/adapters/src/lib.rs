// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod metrics;
pub mod process;
pub mod traced;

pub use metrics::{
    LogMetricsAdapter, MetricLabels, MetricsAdapter, NoOpMetricsAdapter, Step, METRICS_TARGET,
};
pub use process::{CommandSpec, LocalProcessAdapter, ProcessAdapter, ProcessError, ProcessOutput};
pub use traced::TracedProcessAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use metrics::{FakeMetricsAdapter, MetricsCall};
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessAdapter;
