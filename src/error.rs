//! Error types for telegraf-bacnet.
//!
//! Aggregation and rendering never fail. Errors only come from the ambient
//! parts of the crate: configuration, the output sink, the worker thread and
//! decoding producer input.

use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Trigger measurement name cannot be empty")]
    EmptyTrigger,

    #[error("Measurement prefix cannot be empty")]
    EmptyPrefix,

    #[error("Invalid configuration: {reason}")]
    Invalid {
        reason: String,
    },
}

/// Errors raised by the printer worker and its sink.
#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Failed to write line protocol: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn printer worker: {message}")]
    Spawn {
        message: String,
    },

    #[error("Printer worker panicked")]
    WorkerPanicked,
}

/// Errors decoding one line of producer input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Malformed reading: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reading is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum BacnetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Printer error: {0}")]
    Printer(#[from] PrinterError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

impl BacnetError {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this error came from the sink or the worker.
    #[must_use]
    pub const fn is_printer(&self) -> bool {
        matches!(self, Self::Printer(_))
    }

    /// Returns true if this error came from decoding producer input.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

/// Result type alias for telegraf-bacnet operations.
pub type BacnetResult<T> = Result<T, BacnetError>;
