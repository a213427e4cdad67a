// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blueprint selection shared by upload, prepare and exec

use bx_core::BlueprintIdentity;

#[derive(clap::Args, Debug)]
pub struct BlueprintArgs {
    /// Blueprint name
    #[arg(long)]
    pub name: String,

    /// Blueprint version
    #[arg(long = "version", value_name = "VERSION")]
    pub blueprint_version: String,

    /// Blueprint instance uuid
    #[arg(long)]
    pub uuid: String,

    /// Request id for log correlation (generated when omitted)
    #[arg(long)]
    pub request_id: Option<String>,

    /// Sub-request id for log correlation (generated when omitted)
    #[arg(long)]
    pub sub_request_id: Option<String>,
}

impl BlueprintArgs {
    pub fn identity(&self) -> BlueprintIdentity {
        let generate = || uuid::Uuid::new_v4().to_string();
        BlueprintIdentity::new(&self.name, &self.blueprint_version, &self.uuid).with_request(
            self.request_id.clone().unwrap_or_else(generate),
            self.sub_request_id.clone().unwrap_or_else(generate),
        )
    }
}
