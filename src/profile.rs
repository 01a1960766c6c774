//! # Restriction Profiles
//!
//! A declarative TOML form of a full restriction: the promise set, the
//! exec-time promise set, and the unveil allow-list. Profiles exist so a
//! deployment can keep its restriction policy next to its other
//! configuration instead of hard-coding it.
//!
//! ```toml
//! promises = "rpath wpath inet"
//! exec_promises = "stdio rpath"
//!
//! [[unveil]]
//! path = "/tmp"
//! permissions = "rwc"
//!
//! [[unveil]]
//! path = "/etc/resolv.conf"
//! permissions = "r"
//! ```
//!
//! Applying a profile runs the unveil phase before the pledge phase; the
//! reverse order would require granting the `unveil` promise just to finish
//! setting up.

use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::promises::pledge;
use crate::unveil::{PathVisibility, UnveilEntry};

fn default_lock() -> bool {
    true
}

/// A complete restriction policy for one process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestrictionProfile {
    /// Promise set for the current process. Absent means "leave the promise
    /// restriction unchanged"; the empty string means "baseline only".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promises: Option<String>,

    /// Promise set applied across the next exec boundary, passed to the
    /// kernel unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_promises: Option<String>,

    /// Paths that remain visible. An empty list leaves the unveil axis
    /// untouched; denying the whole filesystem is spelled explicitly with a
    /// `path = "/", permissions = ""` entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unveil: Vec<UnveilEntry>,

    /// Seal the visibility set after declaring the entries. Defaults to
    /// true; set to false to allow later declarations.
    #[serde(default = "default_lock")]
    pub lock: bool,
}

impl RestrictionProfile {
    /// Parses a profile from TOML text.
    pub fn from_toml(raw: &str) -> AnyResult<Self> {
        toml::from_str(raw).context("failed to parse restriction profile")
    }

    /// Loads a profile from a TOML file.
    pub fn load_from_file(path: &Path) -> AnyResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read restriction profile {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("invalid restriction profile {}", path.display()))
    }

    /// True when the profile restricts nothing.
    pub fn is_empty(&self) -> bool {
        self.promises.is_none() && self.exec_promises.is_none() && self.unveil.is_empty()
    }

    /// Applies the profile to the current process: unveil entries first
    /// (sealed if `lock` is set), then the pledge.
    ///
    /// Irreversible on success. On failure the kernel state is whatever the
    /// last successful call left it at; nothing is rolled back because
    /// nothing can be.
    pub fn apply(&self) -> Result<()> {
        if !self.unveil.is_empty() {
            let unveiler = PathVisibility::detect().available()?;
            for entry in &self.unveil {
                unveiler.declare(&entry.path, &entry.permissions)?;
            }
            if self.lock {
                unveiler.seal()?;
            }
        }

        if self.promises.is_some() || self.exec_promises.is_some() {
            pledge(self.promises.as_deref(), self.exec_promises.as_deref())?;
        }

        tracing::info!(
            promises = self.promises.as_deref(),
            exec_promises = self.exec_promises.as_deref(),
            unveiled_paths = self.unveil.len(),
            locked = self.lock && !self.unveil.is_empty(),
            "restriction profile applied"
        );
        Ok(())
    }
}
