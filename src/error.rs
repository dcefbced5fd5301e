//! Error handling for the flathash library
//!
//! All errors in this crate are local and non-retryable: they are raised
//! synchronously by the operation that would violate a constraint and leave
//! the affected container in its prior state.

use thiserror::Error;

/// Main error type for the flathash library
#[derive(Error, Debug)]
pub enum FlatHashError {
    /// Configuration or parameter errors, raised before any buffer allocation
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Growing a buffer would exceed the maximum representable capacity
    #[error("Capacity exceeded: requested {requested} slots, maximum is {max}")]
    CapacityExceeded {
        /// Number of slots the operation asked for
        requested: usize,
        /// Largest supported buffer length
        max: usize,
    },
}

impl FlatHashError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a capacity-exceeded error
    pub fn capacity_exceeded(requested: usize, max: usize) -> Self {
        Self::CapacityExceeded { requested, max }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "config",
            Self::CapacityExceeded { .. } => "capacity",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FlatHashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FlatHashError::configuration("load factor out of range");
        assert_eq!(err.category(), "config");

        let err = FlatHashError::capacity_exceeded(1 << 31, 1 << 30);
        assert_eq!(err.category(), "capacity");
    }

    #[test]
    fn test_error_display() {
        let err = FlatHashError::configuration("bad load factor");
        let display = format!("{}", err);
        assert!(display.contains("Invalid configuration"));
        assert!(display.contains("bad load factor"));

        let err = FlatHashError::capacity_exceeded(2048, 1024);
        let display = format!("{}", err);
        assert!(display.contains("2048"));
        assert!(display.contains("1024"));
    }

    #[test]
    fn test_error_debug() {
        let err = FlatHashError::configuration("debug test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Configuration"));
        assert!(debug_str.contains("debug test"));
    }
}
