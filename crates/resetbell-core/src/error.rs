//! Core error types for resetbell-core.
//!
//! Every failure mode the engine can surface is a named variant here. Each is
//! recovered at the boundary of one operation -- one command call, one refresh
//! pass, one firing -- and never takes the process down.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for resetbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Projection-related errors
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Notification delivery errors
    #[error("delivery error: {0}")]
    Notify(#[from] SendError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The event source reported failure. Distinct from an empty event list:
    /// callers skip the current cycle and keep previously scheduled alerts.
    #[error("event source returned no data")]
    DataUnavailable,
}

/// Storage-specific errors. Never conflated with "no record exists".
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the storage root directory
    #[error("failed to create storage root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a record or its temp file
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read an existing record
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a record before writing
    #[error("failed to serialize record for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record exists but does not deserialize
    #[error("corrupt record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to enumerate the storage root
    #[error("failed to list storage root {path}: {source}")]
    ListFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Projection-specific errors.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// The bounded simulation ran out of events before fulfillment.
    /// Indicates non-convergent input such as zero grant amounts.
    #[error("simulation exhausted after {simulated_events} events without fulfillment")]
    ExhaustedSimulation { simulated_events: u32 },
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum SendError {
    /// The destination channel does not exist
    #[error("channel {0} not found")]
    ChannelNotFound(u64),

    /// The destination channel cannot receive messages
    #[error("channel {0} cannot receive messages")]
    NotMessagingCapable(u64),

    /// Transport-level failure
    #[error("notifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The delivery endpoint rejected the message
    #[error("notifier rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
