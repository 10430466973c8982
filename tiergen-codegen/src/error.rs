//! Error types for tiergen-codegen

use thiserror::Error;

/// Result type alias for tiergen-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to fetch schema for database '{database}': {message}")]
    SchemaFetch { database: String, message: String },

    #[error("Tables {tables:?} all resolve to entity name '{entity}'")]
    NameCollision { entity: String, tables: Vec<String> },
}

impl CodegenError {
    pub(crate) fn schema_fetch(database: &str, message: impl Into<String>) -> Self {
        CodegenError::SchemaFetch {
            database: database.to_string(),
            message: message.into(),
        }
    }
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}
