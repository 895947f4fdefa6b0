//! Error types and utilities for configuration binding.

/// Result type alias for binder operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration onto a destination.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration source could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration source could not be parsed
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Unsupported configuration file format
    #[error("Unsupported configuration format")]
    UnsupportedFormat,

    /// An environment value or default literal does not fit the field type
    #[error("Cannot convert value '{value}' of field {field} to {target}")]
    Coercion {
        field: String,
        value: String,
        target: String,
    },

    /// Required fields were still blank after every source was applied
    #[error("Required fields are blank: {}", .fields.join(", "))]
    MissingRequired { fields: Vec<String> },

    /// An environment variable addresses a struct-slice element too far out
    #[error("Index {index} in {variable} exceeds the slice index limit of {limit}")]
    SliceIndex {
        variable: String,
        index: usize,
        limit: usize,
    },

    /// A source carries keys that no field of the destination accepts
    #[error("Unmatched keys in {source_name}: {}", .keys.join(", "))]
    UnmatchedKeys {
        source_name: String,
        keys: Vec<String>,
    },

    /// Converting the destination into a value tree failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Converting the value tree back into the destination failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ConfigError {
    /// Creates a new parse error with context.
    pub fn parse_error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new coercion error for the field at `field`.
    pub fn coercion(
        field: impl Into<String>,
        value: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            field: field.into(),
            value: value.into(),
            target: target.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a new deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Returns true if this error is a source read or parse failure.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Io(_) | ConfigError::Parse { .. } | ConfigError::UnsupportedFormat
        )
    }

    /// Returns true if this error is related to type coercion.
    pub fn is_coercion(&self) -> bool {
        matches!(self, ConfigError::Coercion { .. })
    }

    /// Returns true if this error reports blank required fields.
    pub fn is_missing_required(&self) -> bool {
        matches!(self, ConfigError::MissingRequired { .. })
    }

    /// Returns the paths of blank required fields, if this is that error.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ConfigError::MissingRequired { fields } => fields,
            _ => &[],
        }
    }
}
