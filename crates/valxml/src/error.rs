//! Error types for XML conversion.
//!
//! [`XmlError`] covers everything that aborts a conversion. [`PropertyError`]
//! is carried inside a record property and is always recovered by the emitter.

use std::{fmt, io};

/// Errors that can abort an XML conversion.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// A root name, mapping key or record tag is not a legal XML name.
    #[error("invalid XML name: {0:?}")]
    InvalidName(String),

    /// The value tree nests deeper than the configured limit.
    #[error("value nesting exceeds the maximum depth of {limit}")]
    DepthExceeded {
        /// The configured depth limit.
        limit: usize,
    },

    /// A custom error raised by a `Serialize` implementation.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A map key that cannot be rendered as element text.
    #[error("unsupported map key: {0}")]
    UnsupportedKey(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document is not well-formed.
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
}

impl serde::ser::Error for XmlError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Serde(msg.to_string())
    }
}

/// Convenience result type for XML conversion.
pub type XmlResult<T> = Result<T, XmlError>;

/// Failure to read a single record property.
///
/// The emitter logs it and leaves the property out of the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PropertyError(String);

impl PropertyError {
    /// Create a property error from a message.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}
