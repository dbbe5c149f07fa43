//! Session management.
//!
//! A [`Context`] owns one Zenoh session. Nodes created from the context
//! share the session for all traffic and discovery. The context is an
//! explicit handle: several contexts (sessions) can coexist in one process.

use crate::{
    error::{Error, Result},
    graph::GraphCache,
    keyexpr::LIVELINESS_PREFIX,
    node::Node,
};
use ferros_core::names;
use parking_lot::Mutex;
use std::{
    env,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};
use zenoh::{Session, Wait};

/// Environment variable pointing at a custom Zenoh config file.
pub const ZENOH_SESSION_CONFIG_URI: &str = "ZENOH_SESSION_CONFIG_URI";

/// Environment variable carrying the ROS domain ID.
pub const ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

/// Default router endpoint, matching rmw_zenoh's out-of-the-box setup.
pub const DEFAULT_ROUTER_ENDPOINT: &str = "tcp/localhost:7447";

/// How a session should be opened.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// ROS domain ID.
    pub domain_id: u32,

    /// Path/URI of a Zenoh config file. Overrides `connect` when set.
    pub config_uri: Option<String>,

    /// Endpoints to connect to. Empty means the default local router.
    pub connect: Vec<String>,
}

impl SessionConfig {
    /// Read the session configuration from the environment
    /// (`ROS_DOMAIN_ID`, `ZENOH_SESSION_CONFIG_URI`).
    pub fn from_env() -> Self {
        Self {
            domain_id: env::var(ROS_DOMAIN_ID)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            config_uri: env::var(ZENOH_SESSION_CONFIG_URI).ok(),
            connect: Vec::new(),
        }
    }

    fn build_zenoh_config(&self) -> Result<zenoh::Config> {
        if let Some(uri) = &self.config_uri {
            return zenoh::Config::from_file(uri)
                .map_err(|e| Error::InvalidConfig(format!("failed to load '{uri}': {e}")));
        }

        let mut config = zenoh::Config::default();
        let endpoints = if self.connect.is_empty() {
            vec![DEFAULT_ROUTER_ENDPOINT.to_string()]
        } else {
            self.connect.clone()
        };

        let parsed = endpoints
            .iter()
            .map(|e| e.parse())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidConfig(format!("bad endpoint: {e}")))?;
        config
            .connect
            .endpoints
            .set(parsed)
            .map_err(|e| Error::InvalidConfig(format!("failed to set endpoints: {e:?}")))?;

        Ok(config)
    }
}

struct ContextInner {
    session: Session,
    domain_id: u32,
    session_id: String,
    next_node_id: AtomicU32,
    graph: Arc<Mutex<GraphCache>>,
    closed: AtomicBool,
}

/// A ROS2 context wrapping one Zenoh session.
pub struct Context {
    inner: ContextInner,
}

impl Context {
    /// Open a session configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the Zenoh session cannot be opened.
    pub fn new() -> Result<Arc<Self>> {
        Self::open(SessionConfig::from_env())
    }

    /// Open a session with an explicit configuration.
    pub fn open(config: SessionConfig) -> Result<Arc<Self>> {
        let zenoh_config = config.build_zenoh_config()?;
        Self::with_zenoh_config(config.domain_id, zenoh_config)
    }

    /// Open a session from a prebuilt Zenoh configuration.
    pub fn with_zenoh_config(domain_id: u32, config: zenoh::Config) -> Result<Arc<Self>> {
        tracing::debug!("opening zenoh session (domain {domain_id})");
        let session = zenoh::open(config).wait()?;
        let session_id = session.zid().to_string();

        let ctx = Arc::new(Context {
            inner: ContextInner {
                session,
                domain_id,
                session_id,
                next_node_id: AtomicU32::new(0),
                graph: Arc::new(Mutex::new(GraphCache::new())),
                closed: AtomicBool::new(false),
            },
        });

        ctx.start_discovery()?;
        tracing::debug!("session {} ready", ctx.session_id());
        Ok(ctx)
    }

    /// The ROS domain ID.
    pub fn domain_id(&self) -> u32 {
        self.inner.domain_id
    }

    /// The Zenoh session ID as a hex string.
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// The underlying Zenoh session.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// A snapshot of the discovery graph.
    pub fn graph(&self) -> GraphCache {
        self.inner.graph.lock().clone()
    }

    /// Create a node in this context.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or namespace is invalid, or when the
    /// context was already closed.
    pub fn create_node(self: &Arc<Self>, name: &str, namespace: Option<&str>) -> Result<Arc<Node>> {
        if self.is_closed() {
            return Err(Error::Core(ferros_core::Error::AlreadyShutdown));
        }

        names::validate_node_name(name)?;
        let namespace = namespace.unwrap_or("");
        if !namespace.is_empty() {
            names::validate_namespace(namespace)?;
        }

        let node_id = self.inner.next_node_id.fetch_add(1, Ordering::SeqCst);
        Node::new(Arc::clone(self), node_id, name, namespace)
    }

    /// True once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Close the session. Idempotent; endpoints must have been dropped
    /// before this is called.
    pub fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("closing session {}", self.session_id());
        self.inner.session.close().wait()?;
        Ok(())
    }

    /// Subscribe to liveliness tokens and replay the ones already alive.
    fn start_discovery(&self) -> Result<()> {
        let key = format!("{LIVELINESS_PREFIX}/**");
        let graph = Arc::clone(&self.inner.graph);

        self.inner
            .session
            .liveliness()
            .declare_subscriber(&key)
            .callback(move |sample| {
                graph
                    .lock()
                    .handle_token(sample.key_expr().as_str(), sample.kind());
            })
            .background()
            .wait()?;

        let replies = self.inner.session.liveliness().get(&key).wait()?;
        let mut graph = self.inner.graph.lock();
        while let Ok(reply) = replies.recv() {
            if let Ok(sample) = reply.result() {
                graph.handle_token(sample.key_expr().as_str(), sample.kind());
            }
        }

        Ok(())
    }
}

impl ferros_core::api::RosContext for Context {
    type Node = Node;

    fn create_node(
        self: &Arc<Self>,
        name: &str,
        namespace: Option<&str>,
    ) -> ferros_core::Result<Arc<Node>> {
        Context::create_node(self, name, namespace).map_err(Into::into)
    }

    fn domain_id(&self) -> u32 {
        Context::domain_id(self)
    }

    fn close(&self) -> ferros_core::Result<()> {
        Context::close(self).map_err(Into::into)
    }
}
