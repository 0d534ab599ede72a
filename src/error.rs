//! Error types for the depot file service
//!
//! Provides a unified error type for all depot operations.

use thiserror::Error;

/// Result type alias using DepotError
pub type Result<T> = std::result::Result<T, DepotError>;

/// Unified error type for depot operations
#[derive(Debug, Error)]
pub enum DepotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Worded exactly as clients expect to see it on the wire.
    #[error("File '{0}' not found.")]
    FileNotFound(String),

    /// Name rejected by the flat-namespace rules (separators, `..`, empty).
    #[error("Invalid filename '{0}'.")]
    InvalidFilename(String),

    // -------------------------------------------------------------------------
    // Payload Errors
    // -------------------------------------------------------------------------
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request that could not be decoded or validated. The inner message is
    /// what gets sent back to the client, so it must stand on its own.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An ERROR response from the server, message passed through verbatim.
    #[error("{0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Worker Pool Errors
    // -------------------------------------------------------------------------
    #[error("Worker pool error: {0}")]
    Pool(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
