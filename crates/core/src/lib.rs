// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bx-core: domain types shared by the blueprint executor crates
//!
//! This crate provides:
//! - Blueprint identities and package manifests
//! - Request/result values exchanged with callers
//! - Runtime settings read from the environment
//! - The output classifier for captured script output
//! - Shell escaping for the one argument embedded into a command line

pub mod execution;
pub mod identity;
pub mod output;
pub mod package;
pub mod settings;
pub mod shell;

pub use execution::{ArchiveFormat, ExecutionRequest, ExecutionResult, UploadResult};
pub use identity::{BlueprintIdentity, IdentityError};
pub use output::{classify, truncate_log_lines, ClassifiedOutput};
pub use package::{PackageKind, PackageManifest, PackageSpec, REQUIREMENTS_TXT};
pub use settings::{MetricsSettings, Settings};
pub use shell::shell_escape;
