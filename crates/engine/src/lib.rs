// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Blueprint executor engine
//!
//! Upload unpacks an archive into its workspace. Prepare provisions the
//! sandbox and installs the manifest once, guarded by the marker file.
//! Execute runs one command in the sandbox under a timeout and classifies
//! what it printed.

mod error;
mod executor;
mod install;
mod locks;
mod provision;
mod runner;
pub mod upload;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use error::ExecutorError;
pub use executor::{Executor, ExecutorDeps};
pub use install::{Installer, UTILITY_PACKAGE};
pub use locks::WorkspaceLocks;
pub use provision::{ProvisionOutcome, Provisioner};
pub use runner::{compose_command, RunOutcome, Runner};
pub use workspace::{Workspace, WorkspaceStore, DESCRIPTOR_PATH, MARKER_FILE};
