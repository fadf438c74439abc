//! Layered error definitions
//!
//! Categorized by source: config / transport / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Per-listener send failure
    #[error("transport send to '{listener}' failed: {message}")]
    TransportSend { listener: String, message: String },

    /// Listener's delivery channel is gone
    #[error("transport channel closed for '{listener}'")]
    TransportClosed { listener: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create per-listener send error
    pub fn transport_send(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSend {
            listener: listener.into(),
            message: message.into(),
        }
    }

    /// Create closed-channel error
    pub fn transport_closed(listener: impl Into<String>) -> Self {
        Self::TransportClosed {
            listener: listener.into(),
        }
    }
}
