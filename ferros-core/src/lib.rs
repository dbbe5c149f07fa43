//! Core traits and types for the ferros ROS2 client stack.
//!
//! This crate provides the foundational abstractions for ROS2 functionality
//! without depending on any specific middleware implementation. The transport
//! adapter (Zenoh, a mock for tests, or any future backend) implements the
//! traits in [`api`] and is selected once at process start, never per call.

pub mod api;
pub mod cancel;
pub mod config;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod message;
pub mod msg;
pub mod names;
pub mod qos;
pub mod registry;

// Re-export commonly used types
pub use api::{RosContext, RosNode, RosPublisher, RosServer, RosSubscriber, ServiceRequest};
pub use cancel::CancelToken;
pub use config::{ExecutorKind, NodeConfig};
pub use error::{DynError, Error, Result};
pub use message::{Message, MessageInfo};
pub use msg::{ServiceMsg, TypeSupport};
pub use qos::{DurabilityPolicy, HistoryPolicy, LivelinessPolicy, Profile, ReliabilityPolicy};
pub use registry::{EndpointId, EndpointKind, EndpointRegistry};
