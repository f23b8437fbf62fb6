//! Core error types for pomotimer-core.
//!
//! Most failure modes in the timer are recovered locally (denied permission,
//! failed playback, corrupt preferences) and never reach these types. What is
//! left is I/O against the data directory and input that cannot be coerced
//! into a valid value.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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
    QueryFailed(#[from] rusqlite::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The data directory could not be resolved or created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A preset duration is outside 1..=999 whole minutes
    #[error("{session} duration must be a whole number of minutes between 1 and 999, got {secs}s")]
    PresetOutOfRange { session: String, secs: u32 },

    /// Unrecognized session type name
    #[error("unknown session type '{0}' (expected focus, short or long)")]
    UnknownSessionType(String),

    /// Unrecognized sound key
    #[error("unknown sound '{0}'")]
    UnknownSound(String),

    /// A staging operation was issued while no draft is open
    #[error("settings are not open")]
    StagingClosed,
}

/// Audio playback errors.
///
/// These never escape the notification gateway or the settings staging; they
/// are logged and dropped.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The sound asset is not present on disk
    #[error("sound asset not found: {0}")]
    MissingAsset(PathBuf),

    /// No player is available on this platform
    #[error("no audio player available: {0}")]
    Unavailable(String),

    /// The player failed to start or decode the asset
    #[error("playback failed: {0}")]
    Playback(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::PresetOutOfRange {
            session: "focus".into(),
            secs: 0,
        };
        assert!(err.to_string().contains("between 1 and 999"));

        let err = ValidationError::UnknownSessionType("nap".into());
        assert!(err.to_string().contains("'nap'"));
    }

    #[test]
    fn test_error_conversion() {
        let validation_err = ValidationError::StagingClosed;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::Json(_)));
    }
}
