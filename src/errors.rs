//! Error handling for the fuel-efficiency predictor
//!
//! Feature construction and prediction never fail: they clamp or default.
//! The variants below cover the boundaries where something genuinely can go
//! wrong (configuration, storage, feeds) plus the single training failure.

use thiserror::Error;

/// Main error type for the fuel predictor
#[derive(Error, Debug)]
pub enum FuelError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database operation failed: {operation} - {source}")]
    Database {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network operation failed: {operation}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// Zero usable samples even after augmentation.
    #[error("Not enough data: {message}")]
    InsufficientData { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Mutex lock failed: {resource}")]
    MutexPoisoned { resource: String },
}

/// Type alias for Result with FuelError
pub type FuelResult<T> = Result<T, FuelError>;

impl FuelError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a network error
    pub fn network(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            source,
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short, user-facing status line. Never includes source chains.
    pub fn status_message(&self) -> String {
        match self {
            FuelError::InsufficientData { .. } => "Not enough data".to_string(),
            other => format!("Train failed: {other}"),
        }
    }
}

/// Helper trait for safe mutex operations
///
/// Returns a FuelError on poison instead of panicking.
pub trait SafeLock<T: ?Sized> {
    fn safe_lock(&self) -> FuelResult<std::sync::MutexGuard<'_, T>>;
}

impl<T: ?Sized> SafeLock<T> for std::sync::Mutex<T> {
    fn safe_lock(&self) -> FuelResult<std::sync::MutexGuard<'_, T>> {
        self.lock().map_err(|_| FuelError::MutexPoisoned {
            resource: "generic_mutex".to_string(),
        })
    }
}

/// Convert from sled errors
impl From<sled::Error> for FuelError {
    fn from(err: sled::Error) -> Self {
        FuelError::database("sled_operation", err)
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for FuelError {
    fn from(err: serde_json::Error) -> Self {
        FuelError::serialization("json_operation", err)
    }
}

/// Convert from std::io errors
impl From<std::io::Error> for FuelError {
    fn from(err: std::io::Error) -> Self {
        FuelError::io("io_operation", err)
    }
}

/// Convert from reqwest errors
impl From<reqwest::Error> for FuelError {
    fn from(err: reqwest::Error) -> Self {
        FuelError::network("http_request", err)
    }
}

impl From<figment::Error> for FuelError {
    fn from(err: figment::Error) -> Self {
        FuelError::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = FuelError::config("Missing configuration file");
        assert!(config_err.to_string().contains("Configuration error"));

        let data_err = FuelError::insufficient_data("no fuel logs");
        assert!(data_err.to_string().contains("Not enough data"));
    }

    #[test]
    fn test_error_chaining() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let fuel_err = FuelError::io("reading model", io_err);

        assert!(fuel_err.source().is_some());
        assert!(fuel_err.to_string().contains("I/O operation failed"));
    }

    #[test]
    fn test_status_message_hides_details() {
        assert_eq!(
            FuelError::insufficient_data("empty history").status_message(),
            "Not enough data"
        );

        let msg = FuelError::validation("lambda", "must be >= 0").status_message();
        assert!(msg.starts_with("Train failed:"));
        assert!(msg.contains("lambda"));
    }
}
