//! Lookahead configuration.
//!
//! Defaults that apply to every lookahead unless the call site overrides
//! them. Configuration can be specified in `octofhir.toml` under the
//! `[graphql.lookahead]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql.lookahead]
//! max_depth = 5
//! safe_default = true
//! log_failures = true
//! ```

use serde::{Deserialize, Serialize};

/// Lookahead defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookaheadConfig {
    /// Number of field levels visited below the resolving field.
    /// `None` visits the whole query.
    /// Default: None
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Result reported when a traversal fails and no error hook decides.
    /// `true` means "assume the selections are needed", so callers fetch
    /// too much rather than too little.
    /// Default: true
    #[serde(default = "default_safe_default")]
    pub safe_default: bool,

    /// Log traversal failures that no error hook handled.
    /// Default: true
    #[serde(default = "default_log_failures")]
    pub log_failures: bool,
}

fn default_safe_default() -> bool {
    true
}

fn default_log_failures() -> bool {
    true
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            safe_default: default_safe_default(),
            log_failures: default_log_failures(),
        }
    }
}

impl LookaheadConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == Some(0) {
            return Err("graphql.lookahead.max_depth must be > 0".into());
        }
        Ok(())
    }
}
