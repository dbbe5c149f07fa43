//! In-process mock transport for runtime tests.
//!
//! Implements the `ferros-core` transport API over plain channels: a
//! publisher fans its serialized payload out to every subscriber queue on
//! the same fully qualified topic, and services are request queues with a
//! per-call response channel. Endpoint drops are recorded so tests can
//! assert release order.

#![allow(dead_code)]

use ferros_core::{
    Result,
    api::{RosContext, RosNode, RosPublisher, RosServer, RosSubscriber, ServiceRequest},
    message::{Message, MessageInfo},
    msg::{ServiceMsg, TypeSupport},
    names,
    qos::Profile,
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

type Bytes = Vec<u8>;
type RequestEnvelope = (Bytes, flume::Sender<Bytes>);

/// Mock middleware session.
#[derive(Default)]
pub struct MockContext {
    domain_id: u32,
    topics: Mutex<HashMap<String, Vec<flume::Sender<Bytes>>>>,
    services: Mutex<HashMap<String, flume::Sender<RequestEnvelope>>>,
    /// Endpoint labels in the order they were dropped.
    pub drop_log: Arc<Mutex<Vec<String>>>,
    /// Number of effective `close` calls observed.
    pub close_count: AtomicUsize,
}

impl MockContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drop-order snapshot.
    pub fn dropped(&self) -> Vec<String> {
        self.drop_log.lock().clone()
    }

    /// Send an already-serialized request to a service and return the
    /// channel its response will arrive on.
    pub fn call_service(&self, fq_service: &str, request: Bytes) -> Option<flume::Receiver<Bytes>> {
        let services = self.services.lock();
        let tx = services.get(fq_service)?;
        let (response_tx, response_rx) = flume::unbounded();
        tx.send((request, response_tx)).ok()?;
        Some(response_rx)
    }

    fn deliver(&self, fq_topic: &str, payload: &[u8]) {
        let topics = self.topics.lock();
        if let Some(queues) = topics.get(fq_topic) {
            for queue in queues {
                let _ = queue.send(payload.to_vec());
            }
        }
    }
}

impl RosContext for MockContext {
    type Node = MockNode;

    fn create_node(
        self: &Arc<Self>,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Arc<MockNode>> {
        names::validate_node_name(name)?;
        let namespace = namespace.unwrap_or("");
        if !namespace.is_empty() {
            names::validate_namespace(namespace)?;
        }
        Ok(Arc::new(MockNode {
            ctx: Arc::clone(self),
            name: name.to_string(),
            namespace: namespace.to_string(),
        }))
    }

    fn domain_id(&self) -> u32 {
        self.domain_id
    }

    fn close(&self) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock node.
pub struct MockNode {
    ctx: Arc<MockContext>,
    name: String,
    namespace: String,
}

impl MockNode {
    fn resolve(&self, name: &str) -> Result<String> {
        let namespace = if self.namespace.is_empty() {
            "/"
        } else {
            &self.namespace
        };
        names::expand_topic_name(namespace, &self.name, name)
    }
}

impl RosNode for MockNode {
    type Publisher<T: TypeSupport> = MockPublisher<T>;
    type Subscriber<T: TypeSupport> = MockSubscriber<T>;
    type Server<T: ServiceMsg> = MockServer<T>;

    fn name(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed(&self.name)
    }

    fn namespace(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed(&self.namespace)
    }

    fn fully_qualified_name(&self) -> String {
        names::build_node_fqn(&self.namespace, &self.name)
    }

    fn create_publisher<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        _qos: Profile,
    ) -> Result<MockPublisher<T>> {
        let fq = self.resolve(topic_name)?;
        Ok(MockPublisher {
            ctx: Arc::clone(&self.ctx),
            label: format!("pub:{fq}"),
            fq,
            _phantom: PhantomData,
        })
    }

    fn create_subscriber<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        _qos: Profile,
    ) -> Result<MockSubscriber<T>> {
        let fq = self.resolve(topic_name)?;
        let (tx, rx) = flume::unbounded();
        self.ctx.topics.lock().entry(fq.clone()).or_default().push(tx);
        Ok(MockSubscriber {
            ctx: Arc::clone(&self.ctx),
            label: format!("sub:{fq}"),
            fq,
            queue: rx,
            _phantom: PhantomData,
        })
    }

    fn create_server<T: ServiceMsg>(
        self: &Arc<Self>,
        service_name: &str,
        _qos: Profile,
    ) -> Result<MockServer<T>> {
        let fq = self.resolve(service_name)?;
        let (tx, rx) = flume::unbounded();
        self.ctx.services.lock().insert(fq.clone(), tx);
        Ok(MockServer {
            ctx: Arc::clone(&self.ctx),
            label: format!("srv:{fq}"),
            fq,
            queue: rx,
            _phantom: PhantomData,
        })
    }
}

/// Mock publisher.
pub struct MockPublisher<T> {
    ctx: Arc<MockContext>,
    fq: String,
    label: String,
    _phantom: PhantomData<T>,
}

impl<T: TypeSupport> RosPublisher<T> for MockPublisher<T> {
    fn topic_name(&self) -> &str {
        &self.fq
    }

    fn send(&self, msg: &T) -> Result<()> {
        let payload = msg.to_bytes()?;
        self.ctx.deliver(&self.fq, &payload);
        Ok(())
    }
}

impl<T> Drop for MockPublisher<T> {
    fn drop(&mut self) {
        self.ctx.drop_log.lock().push(self.label.clone());
    }
}

/// Mock subscriber.
pub struct MockSubscriber<T> {
    ctx: Arc<MockContext>,
    fq: String,
    label: String,
    queue: flume::Receiver<Bytes>,
    _phantom: PhantomData<T>,
}

impl<T: TypeSupport> MockSubscriber<T> {
    fn convert(&self, payload: Bytes) -> Result<Message<T>> {
        Ok(Message::new(T::from_bytes(&payload)?, MessageInfo::default()))
    }
}

impl<T: TypeSupport> RosSubscriber<T> for MockSubscriber<T> {
    fn topic_name(&self) -> &str {
        &self.fq
    }

    fn try_recv(&mut self) -> Result<Option<Message<T>>> {
        match self.queue.try_recv() {
            Ok(payload) => self.convert(payload).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Message<T>>> {
        match self.queue.recv_timeout(timeout) {
            Ok(payload) => self.convert(payload).map(Some),
            Err(_) => Ok(None),
        }
    }
}

impl<T> Drop for MockSubscriber<T> {
    fn drop(&mut self) {
        self.ctx.drop_log.lock().push(self.label.clone());
    }
}

/// Mock pending service request.
pub struct MockPendingRequest<T: ServiceMsg> {
    request: T::Request,
    response_tx: flume::Sender<Bytes>,
}

impl<T: ServiceMsg> ServiceRequest<T> for MockPendingRequest<T> {
    fn request(&self) -> &T::Request {
        &self.request
    }

    fn respond(self, response: T::Response) -> Result<()> {
        let payload = response.to_bytes()?;
        self.response_tx
            .send(payload)
            .map_err(|_| ferros_core::Error::ChannelClosed)?;
        Ok(())
    }
}

/// Mock service server.
pub struct MockServer<T: ServiceMsg> {
    ctx: Arc<MockContext>,
    fq: String,
    label: String,
    queue: flume::Receiver<RequestEnvelope>,
    _phantom: PhantomData<T>,
}

impl<T: ServiceMsg> RosServer<T> for MockServer<T> {
    type Request = MockPendingRequest<T>;

    fn service_name(&self) -> &str {
        &self.fq
    }

    fn try_recv(&mut self) -> Result<Option<MockPendingRequest<T>>> {
        match self.queue.try_recv() {
            Ok((payload, response_tx)) => Ok(Some(MockPendingRequest {
                request: T::Request::from_bytes(&payload)?,
                response_tx,
            })),
            Err(_) => Ok(None),
        }
    }
}

impl<T: ServiceMsg> Drop for MockServer<T> {
    fn drop(&mut self) {
        self.ctx.drop_log.lock().push(self.label.clone());
    }
}
