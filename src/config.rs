use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`VerifierConfig::not_delete_flag`].
pub const NOT_DELETE_FLAG_ENV: &str = "RECORDKIT_NOT_DELETE_FLAG";

/// Verifier settings, loadable from `<dir>/recordkit.json` or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Value of the soft-delete column meaning "not deleted".
    pub not_delete_flag: String,
}

impl VerifierConfig {
    pub fn default_not_delete_flag() -> String { "0".to_string() }

    pub fn new(not_delete_flag: impl Into<String>) -> Self { Self { not_delete_flag: not_delete_flag.into() } }

    /// Defaults, with the flag taken from `RECORDKIT_NOT_DELETE_FLAG` when set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(NOT_DELETE_FLAG_ENV) {
            Ok(v) if !v.trim().is_empty() => Self::new(v.trim()),
            _ => Self::default(),
        }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("invalid verifier config")
    }

    /// Read a JSON config file. A missing file yields defaults; an unreadable or
    /// malformed one is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() { return Ok(Self::default()); }
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }
}

impl Default for VerifierConfig {
    fn default() -> Self { Self { not_delete_flag: Self::default_not_delete_flag() } }
}
