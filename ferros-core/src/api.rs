//! Abstract transport API.
//!
//! These traits are the seam between the node runtime and the middleware.
//! The Zenoh adapter implements them for production use; tests implement
//! them with an in-process mock. The runtime is generic over [`RosContext`]
//! and never branches on the concrete transport.

use crate::{
    error::Result,
    message::Message,
    msg::{ServiceMsg, TypeSupport},
    qos::Profile,
};
use std::{borrow::Cow, sync::Arc, time::Duration};

/// A middleware session that can create nodes.
///
/// One context owns exactly one underlying transport session. Contexts are
/// explicit handles, not ambient globals, so several can coexist within one
/// process (and one test).
pub trait RosContext: Send + Sync + Sized + 'static {
    /// The node type created by this context.
    type Node: RosNode;

    /// Create a new node.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or namespace is invalid or the transport
    /// rejects the node.
    fn create_node(self: &Arc<Self>, name: &str, namespace: Option<&str>)
    -> Result<Arc<Self::Node>>;

    /// The ROS domain ID this session participates in.
    fn domain_id(&self) -> u32;

    /// Release the underlying session.
    ///
    /// Called once by the runtime after every endpoint has been released.
    /// Implementations must tolerate repeated calls.
    fn close(&self) -> Result<()>;
}

/// A node that can create endpoints.
pub trait RosNode: Send + Sync + Sized + 'static {
    /// The publisher type created by this node.
    type Publisher<T: TypeSupport>: RosPublisher<T> + 'static;

    /// The subscriber type created by this node.
    type Subscriber<T: TypeSupport>: RosSubscriber<T> + 'static;

    /// The service server type created by this node.
    type Server<T: ServiceMsg>: RosServer<T> + 'static;

    /// The node name.
    fn name(&self) -> Cow<'_, str>;

    /// The node namespace.
    fn namespace(&self) -> Cow<'_, str>;

    /// The fully qualified node name (namespace + name).
    fn fully_qualified_name(&self) -> String;

    /// Create a publisher on `topic_name` (relative, absolute, or `~/`).
    fn create_publisher<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> Result<Self::Publisher<T>>;

    /// Create a subscriber on `topic_name` (relative, absolute, or `~/`).
    fn create_subscriber<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> Result<Self::Subscriber<T>>;

    /// Create a service server on `service_name`.
    fn create_server<T: ServiceMsg>(
        self: &Arc<Self>,
        service_name: &str,
        qos: Profile,
    ) -> Result<Self::Server<T>>;
}

/// A publisher endpoint.
pub trait RosPublisher<T: TypeSupport>: Send + Sync {
    /// The fully qualified topic name.
    fn topic_name(&self) -> &str;

    /// Publish a message.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transport send fails.
    fn send(&self, msg: &T) -> Result<()>;
}

/// A subscriber endpoint.
///
/// Delivery is FIFO per endpoint; ordering across endpoints is not
/// guaranteed.
pub trait RosSubscriber<T: TypeSupport>: Send {
    /// The fully qualified topic name.
    fn topic_name(&self) -> &str;

    /// Take the next message without blocking.
    ///
    /// Returns `Ok(None)` when no message is currently queued.
    fn try_recv(&mut self) -> Result<Option<Message<T>>>;

    /// Take the next message, waiting up to `timeout`.
    ///
    /// Returns `Ok(None)` on timeout.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Message<T>>>;
}

/// An incoming service request that can be responded to exactly once.
pub trait ServiceRequest<T: ServiceMsg>: Send {
    /// The request payload.
    fn request(&self) -> &T::Request;

    /// Send the response back to the caller. Consumes the request so only
    /// one response can be sent.
    fn respond(self, response: T::Response) -> Result<()>;
}

/// A service server endpoint.
pub trait RosServer<T: ServiceMsg>: Send {
    /// The pending-request type returned by the take methods.
    type Request: ServiceRequest<T>;

    /// The fully qualified service name.
    fn service_name(&self) -> &str;

    /// Take the next pending request without blocking.
    ///
    /// Returns `Ok(None)` when no request is currently queued.
    fn try_recv(&mut self) -> Result<Option<Self::Request>>;
}
