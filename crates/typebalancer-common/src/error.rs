//! Error types for TypeBalancer
//!
//! All variants are validation failures raised before any partial result is
//! produced. Gap-filling shortfalls are not errors and have no variant here.

use thiserror::Error;

/// Common result type for TypeBalancer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for TypeBalancer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Position calculation errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Balancing errors
    #[error("cannot balance an empty collection")]
    EmptyCollection,

    #[error("cannot resolve type of item {index}: {reason}")]
    MissingType { index: usize, reason: String },

    #[error("item {index} has type '{type_name}' which is not in the supplied type order")]
    UnknownType { index: usize, type_name: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a missing type error for the item at `index`
    pub fn missing_type(index: usize, reason: impl Into<String>) -> Self {
        Self::MissingType {
            index,
            reason: reason.into(),
        }
    }

    /// Create an unknown type error for the item at `index`
    pub fn unknown_type(index: usize, type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            index,
            type_name: type_name.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if this error was caused by the input collection rather than
    /// by call arguments or configuration
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCollection | Self::MissingType { .. } | Self::UnknownType { .. }
        )
    }

    /// Re-index an item-scoped error, used when a batch reports indices
    /// relative to its own start
    #[must_use]
    pub fn offset_index(self, offset: usize) -> Self {
        match self {
            Self::MissingType { index, reason } => Self::MissingType {
                index: index + offset,
                reason,
            },
            Self::UnknownType { index, type_name } => Self::UnknownType {
                index: index + offset,
                type_name,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_input_classification() {
        assert!(Error::EmptyCollection.is_input_error());
        assert!(Error::missing_type(3, "no field").is_input_error());
        assert!(Error::unknown_type(0, "podcast").is_input_error());
        assert!(!Error::invalid_argument("ratio").is_input_error());
        assert!(!Error::configuration("batch_size").is_input_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::unknown_type(4, "podcast").to_string(),
            "item 4 has type 'podcast' which is not in the supplied type order"
        );
        assert_eq!(
            Error::invalid_argument("ratio must be in [0, 1], got 1.5").to_string(),
            "invalid argument: ratio must be in [0, 1], got 1.5"
        );
    }

    #[test]
    fn test_offset_index() {
        let err = Error::missing_type(2, "blank").offset_index(1000);
        assert_eq!(err, Error::missing_type(1002, "blank"));

        let err = Error::EmptyCollection.offset_index(10);
        assert_eq!(err, Error::EmptyCollection);
    }
}
