//! Error types for the lease allocator.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants.

use std::net::IpAddr;

/// Errors that can occur while allocating or releasing addresses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system I/O error from a storage backend or the config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config or lease files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The address pool is exhausted.
    ///
    /// Sticky reuse, the forward probe, and the released-address scan all
    /// came up empty. Nothing was written to storage.
    #[error("No available addresses in pool")]
    PoolExhausted,

    /// The address being released has no record in storage.
    #[error("Address {0} has no lease record")]
    NotFound(IpAddr),

    /// Invalid allocator configuration.
    ///
    /// Returned by [`Config::validate`](crate::Config::validate), e.g. when
    /// the network has no assignable host addresses.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A client identifier could not be parsed from text.
    #[error("Invalid client identifier: {0}")]
    InvalidClientId(String),
}

/// A specialized Result type for allocator operations.
pub type Result<T> = std::result::Result<T, Error>;
