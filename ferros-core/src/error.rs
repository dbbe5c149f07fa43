//! Error types shared by every ferros crate.
//!
//! Transport adapters define their own error enums and convert into this
//! taxonomy at the API boundary, so runtime code only ever matches on one
//! set of variants.

use crate::qos::QosPolicyKind;
use thiserror::Error;

/// Dynamic error type that can be sent and shared between threads.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for ferros operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the ferros stack.
#[derive(Debug, Error)]
pub enum Error {
    /// The selected middleware implementation could not be brought up.
    ///
    /// Fatal: surfaces to the process exit code at startup.
    #[error("middleware initialization failed: {0}")]
    Initialization(String),

    /// An endpoint was registered on a topic that already carries a
    /// different message type.
    #[error(
        "type mismatch on topic '{topic}': registered as '{registered}', requested '{requested}'"
    )]
    TypeMismatch {
        /// Topic name the registration collided on.
        topic: String,
        /// Type name already recorded for the topic.
        registered: String,
        /// Type name of the rejected registration.
        requested: String,
    },

    /// A subscriber requested a QoS policy a matching publisher does not offer.
    #[error("incompatible {policy} QoS on topic '{topic}'")]
    QosIncompatible {
        /// Topic name the registration collided on.
        topic: String,
        /// The first policy that failed the request-vs-offer check.
        policy: QosPolicyKind,
    },

    /// Mid-session send/receive failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(DynError),

    /// A user callback failed (panicked or returned an error).
    #[error("callback on '{endpoint}' failed: {source}")]
    Callback {
        /// Endpoint the failing callback was registered on.
        endpoint: String,
        /// The underlying failure.
        source: DynError,
    },

    /// Invalid node, namespace, topic, or service name.
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        /// What kind of name failed validation.
        kind: crate::names::NameKind,
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Message encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Operation on a runtime or endpoint that was already shut down.
    #[error("already shut down")]
    AlreadyShutdown,

    /// Operation timed out.
    #[error("timeout")]
    Timeout,

    /// A transport channel was closed while still in use.
    #[error("channel closed")]
    ChannelClosed,
}

impl Error {
    /// Wrap an arbitrary error as a transport failure.
    pub fn transport<E: Into<DynError>>(err: E) -> Self {
        Error::Transport(err.into())
    }
}
