//! Core error types for pocketkit-core.
//!
//! This module defines the error hierarchy shared by the breathing, news and
//! vocabulary modules, built with thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pocketkit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// News API errors
    #[error("News error: {0}")]
    News(#[from] NewsError),

    /// Local account errors
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors raised while talking to the news API.
#[derive(Error, Debug)]
pub enum NewsError {
    /// The configured base URL could not be joined with an endpoint
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx HTTP status
    #[error("Invalid response from {url}: HTTP {status}")]
    InvalidResponse { url: String, status: u16 },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body did not match the expected JSON shape
    #[error("Decoding error: {0}")]
    Decoding(String),
}

/// Errors for the locally stored user account.
#[derive(Error, Debug)]
pub enum AccountError {
    /// Sign-up or sign-in form was missing a field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// No stored account matches the given email
    #[error("No account found for {email}")]
    UnknownAccount { email: String },

    /// Operation requires a signed-in account
    #[error("Not signed in")]
    NotSignedIn,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Identifier did not match any known item
    #[error("Unknown {kind}: {value}")]
    UnknownItem { kind: &'static str, value: String },

    /// Collection limit reached
    #[error("{collection} is full (limit: {limit})")]
    LimitReached {
        collection: &'static str,
        limit: usize,
    },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
