//! Error types for pricewatch-core

use thiserror::Error;

/// Result type alias using pricewatch-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pricewatch-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The AI resolver failed, returned unusable content, or reported an error
    #[error("Could not resolve product: {0}")]
    Resolution(String),

    /// Durable storage read/write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// `SQLite` error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Product not found
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
