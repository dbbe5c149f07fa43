//! The node runtime.
//!
//! One [`NodeRuntime`] owns one middleware session and one node, registers
//! a set of endpoints, drives the spin loop, and releases everything in
//! reverse creation order on shutdown.

use crate::{
    executor::{self, DispatchSlot, PollOutcome},
    middleware::Middleware,
};
use ferros_core::{
    CancelToken, DynError, Error, ExecutorKind, Message, NodeConfig, Profile, Result,
    api::{RosContext, RosNode, RosPublisher, RosSubscriber, ServiceRequest},
    msg::{ServiceMsg, TypeSupport},
    names,
    registry::{EndpointId, EndpointKind, EndpointRegistry},
};
use parking_lot::Mutex;
use std::{
    any::Any,
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

/// What the runtime holds for one registered endpoint, in creation order.
///
/// Dropping an entry releases the transport endpoint; the registry entry is
/// removed alongside it.
enum EndpointSlot {
    /// A publisher, kept alive for outstanding [`PublisherHandle`]s.
    Publisher(Arc<dyn Any + Send + Sync>),
    /// A subscriber or service, owned by its dispatch slot.
    Dispatch(Arc<Mutex<DispatchSlot>>),
}

struct RegisteredEndpoint {
    id: EndpointId,
    name: String,
    slot: EndpointSlot,
}

struct RuntimeState {
    registry: EndpointRegistry,
    endpoints: Vec<RegisteredEndpoint>,
}

/// A ROS2 node runtime over an injected transport context.
///
/// Endpoint registration is serialized behind one lock; the underlying
/// transport session is not assumed reentrant. `spin` blocks; registration
/// never blocks beyond declaring the endpoint.
pub struct NodeRuntime<C: RosContext> {
    context: Arc<C>,
    node: Arc<C::Node>,
    config: NodeConfig,
    state: Mutex<RuntimeState>,
    shut_down: AtomicBool,
}

impl NodeRuntime<ferros_zenoh::Context> {
    /// Bring up a runtime on the configured middleware.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] when the selected middleware
    /// implementation is not loadable or its session cannot be opened, and
    /// [`Error::InvalidName`] for a bad node name or namespace.
    pub fn initialize(config: NodeConfig) -> Result<Self> {
        let middleware = Middleware::resolve(config.middleware.as_deref())?;
        tracing::debug!("selected middleware: {middleware}");
        let context = middleware.open()?;
        Self::with_context(config, context)
    }
}

impl<C: RosContext> NodeRuntime<C> {
    /// Bring up a runtime on an already-open context.
    ///
    /// This is the injection point the transport seam exists for: tests
    /// pass a mock context, `initialize` passes the selected middleware's.
    pub fn with_context(config: NodeConfig, context: Arc<C>) -> Result<Self> {
        let node = context.create_node(&config.node_name, config.namespace.as_deref())?;

        Ok(Self {
            context,
            node,
            config,
            state: Mutex::new(RuntimeState {
                registry: EndpointRegistry::new(),
                endpoints: Vec::new(),
            }),
            shut_down: AtomicBool::new(false),
        })
    }

    /// The underlying transport context.
    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// The node this runtime owns.
    pub fn node(&self) -> &Arc<C::Node> {
        &self.node
    }

    /// The fully qualified node name.
    pub fn fully_qualified_name(&self) -> String {
        self.node.fully_qualified_name()
    }

    /// Number of currently registered endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// The message type registered on `topic`, if any endpoint carries it.
    pub fn topic_type(&self, topic: &str) -> Option<String> {
        let fq = self.resolve_name(topic).ok()?;
        self.state
            .lock()
            .registry
            .topic_type(&fq)
            .map(str::to_string)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            Err(Error::AlreadyShutdown)
        } else {
            Ok(())
        }
    }

    fn resolve_name(&self, name: &str) -> Result<String> {
        let namespace = self.node.namespace();
        let namespace = if namespace.is_empty() {
            "/"
        } else {
            namespace.as_ref()
        };
        names::expand_topic_name(namespace, self.node.name().as_ref(), name)
    }

    /// Register a publisher.
    ///
    /// The returned handle borrows the endpoint: it stays valid until
    /// [`shutdown`](Self::shutdown) releases the endpoint, after which
    /// publishing fails with [`Error::AlreadyShutdown`].
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] or [`Error::QosIncompatible`] when the
    /// registration conflicts with an existing endpoint; transport errors
    /// are passed through (and the registration is rolled back).
    pub fn register_publisher<T: TypeSupport>(
        &self,
        topic: &str,
        qos: Profile,
    ) -> Result<PublisherHandle<T, C>> {
        self.ensure_live()?;
        let fq_name = self.resolve_name(topic)?;

        let mut state = self.state.lock();
        let id = state
            .registry
            .register(EndpointKind::Publisher, &fq_name, T::type_name(), &qos)?;

        let publisher = match self.node.create_publisher::<T>(topic, qos) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                state.registry.deregister(id);
                return Err(e);
            }
        };

        let handle = PublisherHandle {
            inner: Arc::downgrade(&publisher),
            topic: fq_name.clone(),
        };
        state.endpoints.push(RegisteredEndpoint {
            id,
            name: fq_name,
            slot: EndpointSlot::Publisher(publisher),
        });

        Ok(handle)
    }

    /// Register a subscriber with a message callback.
    ///
    /// The callback runs on the executor during `spin`, in per-endpoint
    /// FIFO order. A failing callback is logged and isolated unless the
    /// runtime was configured with fatal callback errors.
    ///
    /// # Errors
    ///
    /// Same contract as [`register_publisher`](Self::register_publisher).
    pub fn register_subscriber<T, F>(
        &self,
        topic: &str,
        qos: Profile,
        mut callback: F,
    ) -> Result<EndpointId>
    where
        T: TypeSupport,
        F: FnMut(Message<T>) -> std::result::Result<(), DynError> + Send + 'static,
    {
        self.ensure_live()?;
        let fq_name = self.resolve_name(topic)?;

        let mut state = self.state.lock();
        let id = state
            .registry
            .register(EndpointKind::Subscriber, &fq_name, T::type_name(), &qos)?;

        let mut subscriber = match self.node.create_subscriber::<T>(topic, qos) {
            Ok(s) => s,
            Err(e) => {
                state.registry.deregister(id);
                return Err(e);
            }
        };

        let poll = Box::new(move || match subscriber.try_recv() {
            Ok(Some(msg)) => match executor::run_callback(|| callback(msg)) {
                Ok(()) => PollOutcome::Dispatched,
                Err(e) => PollOutcome::Failed(e),
            },
            Ok(None) => PollOutcome::Idle,
            Err(e) => PollOutcome::Failed(Box::new(e)),
        });

        let slot = Arc::new(Mutex::new(DispatchSlot::new(fq_name.clone(), poll)));
        state.endpoints.push(RegisteredEndpoint {
            id,
            name: fq_name,
            slot: EndpointSlot::Dispatch(slot),
        });

        Ok(id)
    }

    /// Register a service server with a request handler.
    ///
    /// The handler runs on the executor during `spin`; its response is sent
    /// back through the transport. Handler failures follow the same
    /// isolation rules as subscriber callbacks.
    ///
    /// # Errors
    ///
    /// Same contract as [`register_publisher`](Self::register_publisher).
    pub fn register_service<T, F>(
        &self,
        service: &str,
        qos: Profile,
        mut handler: F,
    ) -> Result<EndpointId>
    where
        T: ServiceMsg,
        F: FnMut(&T::Request) -> T::Response + Send + 'static,
    {
        self.ensure_live()?;
        let fq_name = self.resolve_name(service)?;

        let mut state = self.state.lock();
        let id = state
            .registry
            .register(EndpointKind::Service, &fq_name, T::type_name(), &qos)?;

        let mut server = match self.node.create_server::<T>(service, qos) {
            Ok(s) => s,
            Err(e) => {
                state.registry.deregister(id);
                return Err(e);
            }
        };

        let poll = Box::new(move || {
            use ferros_core::api::RosServer;
            match server.try_recv() {
                Ok(Some(request)) => {
                    let outcome = executor::run_callback(|| {
                        let response = handler(request.request());
                        request.respond(response).map_err(|e| Box::new(e) as DynError)
                    });
                    match outcome {
                        Ok(()) => PollOutcome::Dispatched,
                        Err(e) => PollOutcome::Failed(e),
                    }
                }
                Ok(None) => PollOutcome::Idle,
                Err(e) => PollOutcome::Failed(Box::new(e)),
            }
        });

        let slot = Arc::new(Mutex::new(DispatchSlot::new(fq_name.clone(), poll)));
        state.endpoints.push(RegisteredEndpoint {
            id,
            name: fq_name,
            slot: EndpointSlot::Dispatch(slot),
        });

        Ok(id)
    }

    /// Dispatch messages to registered callbacks until `cancel` fires.
    ///
    /// Per-endpoint delivery is FIFO; ordering across endpoints is not
    /// guaranteed. After cancellation every endpoint is drained of
    /// already-queued messages once, then `spin` returns. With fatal
    /// callback errors configured, the first failure aborts the loop with
    /// [`Error::Callback`]; shutdown is unaffected either way.
    pub fn spin(&self, cancel: &CancelToken) -> Result<()> {
        self.ensure_live()?;

        let slots: Vec<_> = self
            .state
            .lock()
            .endpoints
            .iter()
            .filter_map(|ep| match &ep.slot {
                EndpointSlot::Dispatch(slot) => Some(Arc::clone(slot)),
                EndpointSlot::Publisher(_) => None,
            })
            .collect();

        match self.config.executor {
            ExecutorKind::SingleThreaded => {
                executor::run(&slots, cancel, self.config.fatal_callback_errors)
            }
            ExecutorKind::MultiThreaded(workers) => {
                executor::run_pool(&slots, cancel, self.config.fatal_callback_errors, workers)
            }
        }
    }

    /// Release every endpoint in reverse creation order, then the session.
    ///
    /// Idempotent: repeated calls (including the implicit one on drop) are
    /// no-ops after the first.
    pub fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut state = self.state.lock();
        while let Some(endpoint) = state.endpoints.pop() {
            state.registry.deregister(endpoint.id);
            tracing::debug!("released endpoint '{}'", endpoint.name);
            drop(endpoint);
        }
        drop(state);

        self.context.close()
    }
}

impl<C: RosContext> fmt::Debug for NodeRuntime<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRuntime")
            .field("name", &self.config.node_name)
            .finish_non_exhaustive()
    }
}

impl<C: RosContext> Drop for NodeRuntime<C> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("shutdown on drop failed: {e}");
        }
    }
}

/// Handle to a registered publisher.
///
/// The endpoint itself stays owned by the runtime; the handle weakly
/// borrows it so shutdown can release the endpoint exactly once regardless
/// of outstanding handles.
pub struct PublisherHandle<T: TypeSupport, C: RosContext> {
    inner: Weak<<C::Node as RosNode>::Publisher<T>>,
    topic: String,
}

impl<T: TypeSupport, C: RosContext> PublisherHandle<T, C> {
    /// The fully qualified topic name.
    pub fn topic_name(&self) -> &str {
        &self.topic
    }

    /// Publish a message.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyShutdown`] when the runtime has released the
    /// endpoint; transport errors are passed through.
    pub fn publish(&self, msg: &T) -> Result<()> {
        let publisher = self.inner.upgrade().ok_or(Error::AlreadyShutdown)?;
        publisher.send(msg)
    }
}

impl<T: TypeSupport, C: RosContext> fmt::Debug for PublisherHandle<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherHandle")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl<T: TypeSupport, C: RosContext> Clone for PublisherHandle<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
            topic: self.topic.clone(),
        }
    }
}
