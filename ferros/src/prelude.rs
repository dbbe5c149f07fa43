//! Convenient imports for ferros applications.

pub use crate::{
    middleware::Middleware,
    runtime::{NodeRuntime, PublisherHandle},
    signal::cancel_on_signals,
};
pub use ferros_core::{
    CancelToken, Error, ExecutorKind, Message, NodeConfig, Profile, Result,
    logging::init_logging,
};
