// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blueprint identity
//!
//! A blueprint instance is addressed by `(name, version, uuid)`. The request
//! ids travel with it for correlation only and never influence paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from identity validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("blueprint {0} is empty")]
    Empty(&'static str),
    #[error("blueprint {field} is not a valid path component: {value:?}")]
    InvalidComponent { field: &'static str, value: String },
}

/// Identity of one uploaded blueprint instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlueprintIdentity {
    pub name: String,
    pub version: String,
    pub uuid: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub sub_request_id: String,
}

impl BlueprintIdentity {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            uuid: uuid.into(),
            request_id: String::new(),
            sub_request_id: String::new(),
        }
    }

    pub fn with_request(
        mut self,
        request_id: impl Into<String>,
        sub_request_id: impl Into<String>,
    ) -> Self {
        self.request_id = request_id.into();
        self.sub_request_id = sub_request_id.into();
        self
    }

    /// Check that name, version and uuid are each a single path component.
    pub fn validate(&self) -> Result<(), IdentityError> {
        validate_component("name", &self.name)?;
        validate_component("version", &self.version)?;
        validate_component("uuid", &self.uuid)?;
        Ok(())
    }

    /// `name/version`, the layout used before workspaces carried a uuid
    pub fn legacy_key(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// `name/version/uuid`
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.name, self.version, self.uuid)
    }

    /// Workspace path relative to the deploy directory
    pub fn relative_path(&self) -> PathBuf {
        [&self.name, &self.version, &self.uuid].iter().collect()
    }
}

impl fmt::Display for BlueprintIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn validate_component(field: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() {
        return Err(IdentityError::Empty(field));
    }
    let invalid = value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0');
    if invalid {
        return Err(IdentityError::InvalidComponent {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
