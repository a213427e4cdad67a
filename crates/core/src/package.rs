// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package manifests declared by prepare requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime package name that installs the blueprint's own requirements file
pub const REQUIREMENTS_TXT: &str = "requirements.txt";

/// Kind of dependency, which decides the installer used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    /// Python package installed with the sandbox's pip
    Pip,
    /// Ansible role installed with ansible-galaxy
    AnsibleGalaxy,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Pip => "pip",
            PackageKind::AnsibleGalaxy => "ansible_galaxy",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One manifest entry: an ordered list of packages of a single kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub kind: PackageKind,
    pub packages: Vec<String>,
}

/// Ordered list of package entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageManifest {
    entries: Vec<PackageSpec>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping caller order
    pub fn with<I, S>(mut self, kind: PackageKind, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(PackageSpec {
            kind,
            packages: packages.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn entries(&self) -> &[PackageSpec] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.packages.is_empty())
    }

    /// Entries in install order: all pip entries, then all ansible-galaxy
    /// entries, each group in caller order.
    pub fn install_order(&self) -> impl Iterator<Item = &PackageSpec> {
        let pip = self.entries.iter().filter(|e| e.kind == PackageKind::Pip);
        let galaxy = self
            .entries
            .iter()
            .filter(|e| e.kind == PackageKind::AnsibleGalaxy);
        pip.chain(galaxy)
    }
}

impl From<Vec<PackageSpec>> for PackageManifest {
    fn from(entries: Vec<PackageSpec>) -> Self {
        Self { entries }
    }
}
