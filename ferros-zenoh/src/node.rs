//! Node entity.

use crate::{
    attachment::generate_gid,
    context::Context,
    error::Result,
    keyexpr::TokenScope,
    service::server::Server,
    topic::{publisher::Publisher, subscriber::Subscriber},
};
use ferros_core::{
    message::GID_SIZE,
    msg::{ServiceMsg, TypeSupport},
    names,
    qos::Profile,
};
use std::{
    borrow::Cow,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};
use zenoh::{Wait, liveliness::LivelinessToken};

/// A named participant in the ROS graph.
///
/// A node announces itself with a liveliness token and creates the
/// endpoints that carry traffic. Endpoints keep their node alive through an
/// `Arc`, so a node is only undeclared after its last endpoint is gone.
pub struct Node {
    context: Arc<Context>,
    node_id: u32,
    name: String,
    namespace: String,
    gid: [u8; GID_SIZE],
    // Entity ids start at 10, matching rmw_zenoh's numbering.
    next_entity_id: AtomicU32,
    _token: LivelinessToken,
}

impl Node {
    pub(crate) fn new(
        context: Arc<Context>,
        node_id: u32,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<Self>> {
        let scope = TokenScope {
            domain_id: context.domain_id(),
            session_id: context.session_id(),
            node_id,
            enclave: "",
            namespace,
            node_name: name,
        };
        let token = context
            .session()
            .liveliness()
            .declare_token(scope.node_token())
            .wait()?;

        tracing::debug!("node '{}' up (id {node_id})", names::build_node_fqn(namespace, name));

        Ok(Arc::new(Node {
            context,
            node_id,
            name: name.to_string(),
            namespace: namespace.to_string(),
            gid: generate_gid(),
            next_entity_id: AtomicU32::new(10),
            _token: token,
        }))
    }

    /// The node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node namespace (empty for the root namespace).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The fully qualified node name.
    pub fn fully_qualified_name(&self) -> String {
        names::build_node_fqn(&self.namespace, &self.name)
    }

    /// The node GID.
    pub fn gid(&self) -> &[u8; GID_SIZE] {
        &self.gid
    }

    /// The owning context.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub(crate) fn node_id(&self) -> u32 {
        self.node_id
    }

    pub(crate) fn allocate_entity_id(&self) -> u32 {
        self.next_entity_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Token scope shared by this node's entity liveliness tokens.
    pub(crate) fn token_scope(&self) -> TokenScope<'_> {
        TokenScope {
            domain_id: self.context.domain_id(),
            session_id: self.context.session_id(),
            node_id: self.node_id,
            enclave: "",
            namespace: &self.namespace,
            node_name: &self.name,
        }
    }

    /// Expand a topic/service name to its fully qualified form.
    pub fn resolve_name(&self, name: &str) -> Result<String> {
        let namespace = if self.namespace.is_empty() {
            "/"
        } else {
            &self.namespace
        };
        Ok(names::expand_topic_name(namespace, &self.name, name)?)
    }

    /// Create a publisher on `topic_name` (relative, absolute, or `~/`).
    pub fn create_publisher<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> Result<Publisher<T>> {
        let fq_name = self.resolve_name(topic_name)?;
        Publisher::new(Arc::clone(self), &fq_name, qos)
    }

    /// Create a subscriber on `topic_name` (relative, absolute, or `~/`).
    pub fn create_subscriber<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> Result<Subscriber<T>> {
        let fq_name = self.resolve_name(topic_name)?;
        Subscriber::new(Arc::clone(self), &fq_name, qos)
    }

    /// Create a service server on `service_name`.
    pub fn create_server<T: ServiceMsg>(
        self: &Arc<Self>,
        service_name: &str,
        qos: Profile,
    ) -> Result<Server<T>> {
        let fq_name = self.resolve_name(service_name)?;
        Server::new(Arc::clone(self), &fq_name, qos)
    }
}

impl ferros_core::api::RosNode for Node {
    type Publisher<T: TypeSupport> = Publisher<T>;
    type Subscriber<T: TypeSupport> = Subscriber<T>;
    type Server<T: ServiceMsg> = Server<T>;

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn namespace(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.namespace)
    }

    fn fully_qualified_name(&self) -> String {
        Node::fully_qualified_name(self)
    }

    fn create_publisher<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> ferros_core::Result<Publisher<T>> {
        Node::create_publisher(self, topic_name, qos).map_err(Into::into)
    }

    fn create_subscriber<T: TypeSupport>(
        self: &Arc<Self>,
        topic_name: &str,
        qos: Profile,
    ) -> ferros_core::Result<Subscriber<T>> {
        Node::create_subscriber(self, topic_name, qos).map_err(Into::into)
    }

    fn create_server<T: ServiceMsg>(
        self: &Arc<Self>,
        service_name: &str,
        qos: Profile,
    ) -> ferros_core::Result<Server<T>> {
        Node::create_server(self, service_name, qos).map_err(Into::into)
    }
}
