//! Configuration management for Sluice.
//!
//! Configuration is plain data: it deserializes from JSON and every field has
//! a default, so an empty document is a valid configuration.

use std::path::Path;

use common_error::{SluiceResult, value_err};
use serde::{Deserialize, Serialize};

/// Pass cap that is enough for the default rule set to stabilize.
pub const DEFAULT_MAX_PASSES: usize = 5;

/// Global Sluice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SluiceConfig {
    /// Optimizer configuration.
    pub optimizer: OptimizerSettings,
}

impl SluiceConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> SluiceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SluiceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> SluiceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the optimizer cannot run with.
    pub fn validate(&self) -> SluiceResult<()> {
        if self.optimizer.max_passes == 0 {
            value_err!("optimizer.max_passes must be at least 1");
        }
        if self.optimizer.rewrite_budget_per_pass == Some(0) {
            value_err!("optimizer.rewrite_budget_per_pass must be at least 1");
        }
        Ok(())
    }
}

/// Fixed-point optimizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Maximum number of passes before the optimizer reports non-convergence.
    pub max_passes: usize,
    /// Optional cap on the rewrites within one pass; `None` leaves passes
    /// unbounded.
    pub rewrite_budget_per_pass: Option<usize>,
    /// Run the link consistency checker after every pass.
    pub check_links: bool,
    /// Record before/after renderings for every applied rewrite.
    pub enable_trace: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            rewrite_budget_per_pass: None,
            check_links: false,
            enable_trace: false,
        }
    }
}
