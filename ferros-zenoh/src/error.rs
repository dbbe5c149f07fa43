//! Error types for the Zenoh adapter.

use thiserror::Error;

/// Result type for Zenoh adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the Zenoh adapter.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the ferros core layer (names, registry, serialization).
    #[error(transparent)]
    Core(#[from] ferros_core::Error),

    /// Error reported by the Zenoh session.
    #[error("zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    /// A malformed message attachment was received.
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    /// The sample channel behind a subscriber or server was closed.
    #[error("channel closed")]
    ChannelClosed,

    /// Invalid session configuration.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl From<Error> for ferros_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(e) => e,
            Error::Zenoh(e) => ferros_core::Error::transport(e),
            Error::InvalidAttachment(msg) => ferros_core::Error::Serialization(msg),
            Error::ChannelClosed => ferros_core::Error::ChannelClosed,
            Error::InvalidConfig(msg) => ferros_core::Error::Initialization(msg),
        }
    }
}
