// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod blueprint;
pub mod daemon;
pub mod exec;
pub mod prepare;
pub mod upload;
