//! Error types for tagrules

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// tagrules errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("The operator '=>' requires a single tag on both the left and right hand sides in rule '{rule}'")]
    InvalidDefinition { rule: String },

    #[error("The operator '::' requires a single tag on the right hand side in rule '{rule}'")]
    InvalidSpecialization { rule: String },

    #[error("Tag must not be empty")]
    EmptyTag,

    #[error("Invalid tag '{tag}' in rule '{rule}'")]
    InvalidTag { tag: String, rule: String },

    #[error("Specialization '{child} :: {parent}' would create a cycle")]
    SpecializationCycle { child: String, parent: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
