//! Engine configuration
//!
//! Loaded from YAML or JSON. Every field has a default, so an empty document
//! is a valid configuration.
//!
//! ```yaml
//! abstract_property: abstract
//! validate_tags: true
//! reject_specialization_cycles: false
//! ```

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options applied while compiling a rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    /// Property that marks a tag as abstract
    #[serde(default = "default_abstract_property")]
    pub abstract_property: String,

    /// Reject rules whose tags do not match the tag grammar
    #[serde(default)]
    pub validate_tags: bool,

    /// Reject specialization edges that would close a cycle
    #[serde(default)]
    pub reject_specialization_cycles: bool,
}

fn default_abstract_property() -> String {
    "abstract".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            abstract_property: default_abstract_property(),
            validate_tags: false,
            reject_specialization_cycles: false,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_norway::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.abstract_property.trim().is_empty() {
            return Err(Error::Config(
                "abstract_property must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
