use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pricewatch_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No product URL provided")]
    EmptyUrl,
    #[error("Product ID cannot be empty")]
    EmptyProductId,
    #[error("Product not found for id/prefix: {0}")]
    ProductNotFound(String),
    #[error("{0}")]
    AmbiguousProductId(String),
    #[error("Nothing to edit: pass --url or an affiliate option")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Price lookups are not configured. Set GEMINI_API_KEY (in the environment or a .env file).")]
    ResolverNotConfigured,
}
