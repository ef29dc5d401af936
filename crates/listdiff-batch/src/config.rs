use serde::{Deserialize, Serialize};

use listdiff_diff::DiffMode;

use crate::error::{Result, UpdateError};

/// Configuration for an [`Updater`](crate::Updater).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// How groups with matching identities are compared.
    pub diff_mode: DiffMode,
    /// Check every operation against the snapshot sizes before handing it to
    /// the renderer. A violation aborts the cycle with a panic.
    pub validate_operations: bool,
    /// Rebuild groups the diff reports as updated with a delete+insert pair.
    pub reload_updated_groups: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            diff_mode: DiffMode::Equality,
            validate_operations: true,
            reload_updated_groups: true,
        }
    }
}

impl UpdaterConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| UpdateError::Config(e.to_string()))
    }

    /// Compare groups by identity only; value changes never rebuild a group.
    pub fn identity_only() -> Self {
        Self {
            diff_mode: DiffMode::Identity,
            reload_updated_groups: false,
            ..Default::default()
        }
    }
}
