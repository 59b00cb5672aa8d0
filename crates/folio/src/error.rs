//! Error types for formatter registration and rendering.
//!
//! [`FormatError`] is the single error type returned by every fallible
//! operation in this crate. Failures raised inside stage procedures travel
//! back to the caller of [`Registry::render`](crate::Registry::render)
//! unchanged; nothing here retries or recovers.

use thiserror::Error;

/// Error type for formatter operations.
#[derive(Debug, Error)]
pub enum FormatError {
    /// No formatter class is registered for this renderer/format pair.
    #[error("no formatter registered for format '{format}' on renderer '{renderer}'")]
    UnknownFormat {
        /// The renderer that was asked to render
        renderer: String,
        /// The requested format identifier
        format: String,
    },

    /// A formatter class name was referenced before it was added.
    #[error("unknown formatter: {0}")]
    UnknownFormatter(String),

    /// A renderer name was referenced that has not been defined.
    #[error("unknown renderer: {0}")]
    UnknownRenderer(String),

    /// A named operation is neither a procedure nor a format of the class.
    #[error("formatter '{formatter}' does not support operation '{name}'")]
    UnsupportedOperation {
        /// Name of the formatter class
        formatter: String,
        /// The operation that was requested
        name: String,
    },

    /// An option was read through a reader that was never declared.
    #[error("formatter '{formatter}' has no option reader for '{name}'")]
    UndeclaredOption {
        /// Name of the formatter class
        formatter: String,
        /// The option name
        name: String,
    },

    /// A renderer requires an option the caller did not supply.
    #[error("renderer '{renderer}' requires option '{name}'")]
    MissingOption {
        /// The renderer declaring the requirement
        renderer: String,
        /// The missing option name
        name: String,
    },

    /// The template named in the options is not in the store.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The formatter data does not have the shape a helper needs.
    #[error("unexpected data: expected {expected}")]
    UnexpectedData {
        /// Description of the expected shape
        expected: &'static str,
    },

    /// Failure raised by a stage procedure.
    #[error("{0}")]
    Stage(String),

    /// I/O error (e.g. saving output to disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data or template (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl FormatError {
    /// Creates a stage failure from any displayable message.
    pub fn stage(message: impl Into<String>) -> Self {
        FormatError::Stage(message.into())
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for FormatError {
    fn from(err: serde_yaml::Error) -> Self {
        FormatError::Serialization(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for FormatError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        FormatError::Serialization(err.to_string())
    }
}

/// Result type for formatter operations.
pub type Result<T> = std::result::Result<T, FormatError>;
