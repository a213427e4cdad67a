// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Blueprint executor daemon (bxd) library
//!
//! Exposes the IPC protocol so the CLI can talk to the daemon.

pub mod protocol;

pub use protocol::{ProtocolError, Request, Response};
