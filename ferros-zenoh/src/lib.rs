//! Zenoh transport adapter for the ferros ROS2 stack.
//!
//! Implements the `ferros-core` transport API on top of a Zenoh session,
//! following the rmw_zenoh design
//! (<https://github.com/ros2/rmw_zenoh/blob/rolling/docs/design.md>) so that
//! nodes built with this crate interoperate with standard ROS2 nodes running
//! `rmw_zenoh_cpp`:
//!
//! - a [`Context`] owns one Zenoh session;
//! - [`Node`]s announce themselves with liveliness tokens and feed a
//!   [`GraphCache`] for discovery;
//! - publishers and subscribers map to Zenoh pub/sub on
//!   `<domain>/<topic>/<type>/<hash>` key expressions;
//! - service servers map to Zenoh queryables.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod attachment;
mod context;
mod error;
mod graph;
mod keyexpr;
mod node;
mod qos;

pub mod service;
pub mod topic;

pub use attachment::{Attachment, generate_gid};
pub use context::{Context, SessionConfig};
pub use error::{Error, Result};
pub use graph::{EntityInfo, GraphCache};
pub use keyexpr::EntityKind;
pub use node::Node;
pub use qos::QosMapping;
pub use service::server::{PendingRequest, Server};
pub use topic::{publisher::Publisher, subscriber::Subscriber};

// Core re-exports, so downstream code rarely needs ferros-core directly.
pub use ferros_core::{Message, MessageInfo, Profile, ServiceMsg, TypeSupport};
