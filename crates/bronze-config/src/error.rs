//! Document parsing and patching errors.

use bronze_core::registry::SourceType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("{field} is not applicable to {source_type} sources")]
    Inapplicable {
        field: String,
        source_type: SourceType,
    },

    #[error("unrecognized value for {field}: {value}")]
    UnknownOption { field: String, value: String },

    #[error("unknown field path: {0}")]
    UnknownPath(String),

    #[error("{0} cannot be unset")]
    NotNullable(String),

    #[error(transparent)]
    Registry(#[from] bronze_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Dot path of the offending field, when the error refers to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField(path)
            | ConfigError::UnknownPath(path)
            | ConfigError::NotNullable(path)
            | ConfigError::InvalidValue { field: path, .. }
            | ConfigError::Inapplicable { field: path, .. }
            | ConfigError::UnknownOption { field: path, .. } => Some(path),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
