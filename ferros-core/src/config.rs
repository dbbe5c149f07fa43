//! Runtime configuration.

/// Environment variable selecting the middleware implementation, as used by
/// the standard ROS2 tooling.
pub const RMW_IMPLEMENTATION: &str = "RMW_IMPLEMENTATION";

/// Executor model for the spin loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    /// One cooperative loop dispatching every endpoint.
    SingleThreaded,

    /// `n` worker threads; each endpoint is pinned to one worker, so
    /// per-endpoint FIFO order is preserved.
    MultiThreaded(usize),
}

impl Default for ExecutorKind {
    fn default() -> Self {
        Self::SingleThreaded
    }
}

/// Configuration for one node runtime.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Node name.
    pub node_name: String,

    /// Node namespace. `None` means the root namespace.
    pub namespace: Option<String>,

    /// Middleware implementation to load. `None` reads
    /// [`RMW_IMPLEMENTATION`] from the environment.
    pub middleware: Option<String>,

    /// Executor model driving `spin`.
    pub executor: ExecutorKind,

    /// When set, a failing callback aborts `spin` with an error instead of
    /// being logged and skipped.
    pub fatal_callback_errors: bool,
}

impl NodeConfig {
    /// Configuration for a node with the given name in the root namespace.
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            namespace: None,
            middleware: None,
            executor: ExecutorKind::default(),
            fatal_callback_errors: false,
        }
    }

    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Select the middleware implementation explicitly, bypassing the
    /// environment.
    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware = Some(middleware.into());
        self
    }

    /// Select the executor model.
    pub fn executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    /// Treat callback failures as fatal to `spin`.
    pub fn fatal_callback_errors(mut self, fatal: bool) -> Self {
        self.fatal_callback_errors = fatal;
        self
    }
}
