//! ROS2 node runtime over pluggable middleware.
//!
//! A [`NodeRuntime`] owns exactly one middleware session, a registry of
//! endpoints, and a spin loop. The transport behind it is selected once at
//! startup — from the standard `RMW_IMPLEMENTATION` environment variable or
//! explicitly through [`NodeConfig`] — and injected as a
//! [`ferros_core::api::RosContext`] implementation; runtime code never
//! branches on the concrete middleware.
//!
//! # Example
//!
//! ```ignore
//! use ferros::prelude::*;
//! use ferros_msg::std_msgs;
//!
//! let runtime = NodeRuntime::initialize(NodeConfig::new("listener"))?;
//! runtime.register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), |msg| {
//!     tracing::info!("I heard: '{}'", msg.data.data);
//!     Ok(())
//! })?;
//!
//! let cancel = ferros::signal::cancel_on_signals()?;
//! runtime.spin(&cancel)?;
//! runtime.shutdown()?;
//! ```

mod executor;
pub mod middleware;
pub mod prelude;
pub mod runtime;
pub mod signal;

pub use middleware::Middleware;
pub use runtime::{NodeRuntime, PublisherHandle};

// Re-export the building blocks so applications depend on one crate.
pub use ferros_core::{
    self, CancelToken, Error, ExecutorKind, Message, NodeConfig, Profile, Result,
    logging::init_logging,
};
pub use ferros_msg as msg;
pub use ferros_zenoh as zenoh_transport;
