//! Error types for proxylist.

/// A specialized Result type for proxylist operations.
pub type Result<T> = std::result::Result<T, ListError>;

/// Errors raised by list operations.
///
/// Sort key problems never surface here: an unknown sort key falls back
/// to the natural index at construction and is ignored on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// A property lookup named a property the entity type does not expose.
    #[error("Property '{name}' does not exist for the given entity type")]
    UnknownProperty {
        /// The name that failed to resolve.
        name: String,
    },

    /// A structural mutation was attempted on a read-only list.
    #[error("Operation '{operation}' is not supported on a read-only proxy list")]
    NotSupported {
        /// The rejected operation.
        operation: &'static str,
    },

    /// A position was outside the bounds of the list.
    #[error("Position {index} is out of range for a list of length {len}")]
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The list length at the time of the call.
        len: usize,
    },
}

impl ListError {
    /// Create an unknown-property error.
    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty { name: name.into() }
    }

    /// Create a not-supported error for the named operation.
    pub fn not_supported(operation: &'static str) -> Self {
        Self::NotSupported { operation }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }
}
