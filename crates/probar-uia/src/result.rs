//! Result and error types for probar-uia.

use thiserror::Error;

/// Result type for probar-uia operations
pub type UiaResult<T> = Result<T, UiaError>;

/// Result type returned by accessibility oracle calls
pub type OracleResult<T> = Result<T, OracleError>;

/// Failures reported by the accessibility oracle itself.
///
/// Adapters only need this type; it converts into [`UiaError`] at the crate
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The node's underlying UI is gone
    #[error("Element is no longer available")]
    ElementUnavailable,

    /// The provider does not implement the requested operation
    #[error("Operation not supported by the accessibility provider: {operation}")]
    NotSupported {
        /// Operation name
        operation: String,
    },

    /// Any other provider failure
    #[error("Accessibility provider call failed: {message}")]
    Failed {
        /// Error message
        message: String,
    },
}

impl OracleError {
    /// Create a generic provider failure
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Create a not-supported failure
    #[must_use]
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    /// Whether this failure means the element went stale
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::ElementUnavailable)
    }
}

/// Errors that can occur in probar-uia
#[derive(Debug, Error)]
pub enum UiaError {
    /// An enumerated property could not be attributed to any known pattern
    #[error("Registry inconsistency: property {property} belongs to unknown owner {owner}")]
    RegistryInconsistency {
        /// Programmatic name of the property
        property: String,
        /// Owner identifier parsed from the programmatic name
        owner: String,
    },

    /// A filter names a property the registry does not know
    #[error("Failed to find property for {name}")]
    UnresolvedProperty {
        /// Name as given by the caller
        name: String,
    },

    /// A `group__property` filter names an unknown group
    #[error("Failed to find pattern group {name}")]
    UnknownGroup {
        /// Group name as given by the caller
        name: String,
    },

    /// No supported property, pattern member or base field matches
    #[error("Element has no attribute {name}")]
    UnknownAttribute {
        /// Name as given by the caller
        name: String,
    },

    /// The attribute resolved to a property value, which cannot be called
    #[error("Attribute {name} is a property, not a callable member")]
    NotCallable {
        /// Name as given by the caller
        name: String,
    },

    /// The attribute resolved to a pattern method, which a read never runs
    #[error("Attribute {name} is a pattern method; call it with invoke")]
    NotReadable {
        /// Name as given by the caller
        name: String,
    },

    /// The element went stale during an operation that required it
    #[error("Element is no longer available")]
    ElementUnavailable,

    /// Other oracle failure
    #[error("Oracle error: {0}")]
    Oracle(OracleError),

    /// A property value could not be converted to the requested host type
    #[error("Value conversion failed: expected {expected}, found {found}")]
    ValueConversion {
        /// Requested host type
        expected: &'static str,
        /// Actual value kind
        found: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl UiaError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means the element went stale
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ElementUnavailable | Self::Oracle(OracleError::ElementUnavailable)
        )
    }
}

impl From<OracleError> for UiaError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::ElementUnavailable => Self::ElementUnavailable,
            other => Self::Oracle(other),
        }
    }
}
