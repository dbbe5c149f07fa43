//! Key expression builders compatible with rmw_zenoh_cpp.
//!
//! Topic traffic uses `<domain>/<name>/<dds_type>/<rihs01_hash>`; discovery
//! uses liveliness tokens under [`LIVELINESS_PREFIX`] with `%`-mangled names
//! and a sparse QoS suffix (a field is only written when it differs from the
//! rmw_zenoh default).

use ferros_core::qos::{
    DurabilityPolicy, HistoryPolicy, LivelinessPolicy, Profile, ReliabilityPolicy,
};
use std::time::Duration;

/// Prefix for ROS2 discovery liveliness tokens.
pub const LIVELINESS_PREFIX: &str = "@ros2_lv";

/// Entity kinds announced through liveliness tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Node entity.
    Node,
    /// Message publisher.
    Publisher,
    /// Message subscriber.
    Subscriber,
    /// Service server.
    ServiceServer,
    /// Service client.
    ServiceClient,
}

impl EntityKind {
    /// The two-letter token code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Node => "NN",
            Self::Publisher => "MP",
            Self::Subscriber => "MS",
            Self::ServiceServer => "SS",
            Self::ServiceClient => "SC",
        }
    }

    /// Parse a token code back into an entity kind.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "NN" => Some(Self::Node),
            "MP" => Some(Self::Publisher),
            "MS" => Some(Self::Subscriber),
            "SS" => Some(Self::ServiceServer),
            "SC" => Some(Self::ServiceClient),
            _ => None,
        }
    }
}

/// Build the key expression carrying topic or service traffic.
///
/// The leading slash of the fully qualified name is stripped; the domain id
/// takes its place as the first chunk.
pub fn topic_keyexpr(domain_id: u32, fq_name: &str, type_name: &str, type_hash: &str) -> String {
    let name = fq_name.strip_prefix('/').unwrap_or(fq_name);
    format!("{domain_id}/{name}/{type_name}/{type_hash}")
}

/// Replace `/` with `%` for use inside a single token chunk. Empty names
/// become a bare `%`.
pub fn mangle(name: &str) -> String {
    if name.is_empty() {
        "%".to_string()
    } else {
        name.replace('/', "%")
    }
}

/// Inverse of [`mangle`].
pub fn unmangle(chunk: &str) -> String {
    if chunk == "%" {
        String::new()
    } else {
        chunk.replace('%', "/")
    }
}

/// The per-node portion of a liveliness token: everything an entity token
/// shares with its node's token.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenScope<'a> {
    pub domain_id: u32,
    pub session_id: &'a str,
    pub node_id: u32,
    pub enclave: &'a str,
    pub namespace: &'a str,
    pub node_name: &'a str,
}

impl TokenScope<'_> {
    /// Liveliness token for the node itself. The entity id slot repeats the
    /// node id.
    pub fn node_token(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}/{}/{}/{}",
            LIVELINESS_PREFIX,
            self.domain_id,
            self.session_id,
            self.node_id,
            self.node_id,
            EntityKind::Node.code(),
            mangle(self.enclave),
            mangle(self.namespace),
            self.node_name,
        )
    }

    /// Liveliness token for an endpoint of this node.
    pub fn entity_token(
        &self,
        entity_id: u32,
        kind: EntityKind,
        fq_name: &str,
        type_name: &str,
        type_hash: &str,
        qos: &Profile,
    ) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}/{}/{}/{}/{}/{}/{}/{}",
            LIVELINESS_PREFIX,
            self.domain_id,
            self.session_id,
            self.node_id,
            entity_id,
            kind.code(),
            mangle(self.enclave),
            mangle(self.namespace),
            self.node_name,
            mangle(fq_name),
            type_name,
            type_hash,
            qos_suffix(qos),
        )
    }
}

// rmw_zenoh default QoS codes (from rmw_zenoh_cpp/src/detail/qos.cpp):
// reliability Reliable(1), durability Volatile(2), history KeepLast(1),
// depth 42, liveliness Automatic(1), durations infinite (encoded empty).
const DEFAULT_RELIABILITY: u64 = 1;
const DEFAULT_DURABILITY: u64 = 2;
const DEFAULT_HISTORY: u64 = 1;
const DEFAULT_DEPTH: u64 = 42;
const DEFAULT_LIVELINESS: u64 = 1;

fn reliability_code(p: ReliabilityPolicy) -> u64 {
    match p {
        ReliabilityPolicy::SystemDefault => 0,
        ReliabilityPolicy::Reliable => 1,
        ReliabilityPolicy::BestEffort => 2,
    }
}

fn durability_code(p: DurabilityPolicy) -> u64 {
    match p {
        DurabilityPolicy::SystemDefault => 0,
        DurabilityPolicy::TransientLocal => 1,
        DurabilityPolicy::Volatile => 2,
    }
}

fn history_code(p: HistoryPolicy) -> u64 {
    match p {
        HistoryPolicy::SystemDefault => 0,
        HistoryPolicy::KeepLast => 1,
        HistoryPolicy::KeepAll => 2,
    }
}

fn liveliness_code(p: LivelinessPolicy) -> u64 {
    match p {
        LivelinessPolicy::SystemDefault => 0,
        LivelinessPolicy::Automatic => 1,
        LivelinessPolicy::ManualByTopic => 2,
    }
}

/// Encode a QoS profile into the sparse token suffix used by rmw_zenoh:
/// `R:D:H,Depth:DeadlineS,DeadlineNs:LifespanS,LifespanNs:Lv,LeaseS,LeaseNs`.
pub fn qos_suffix(qos: &Profile) -> String {
    fn sparse(value: u64, default: u64) -> String {
        if value == default {
            String::new()
        } else {
            value.to_string()
        }
    }
    // Zero durations mean "unspecified", which rmw_zenoh encodes as the
    // (infinite) default, i.e. an empty field.
    fn secs(d: Duration) -> String {
        if d.is_zero() {
            String::new()
        } else {
            d.as_secs().to_string()
        }
    }
    fn nanos(d: Duration) -> String {
        if d.is_zero() {
            String::new()
        } else {
            d.subsec_nanos().to_string()
        }
    }

    format!(
        "{}:{}:{},{}:{},{}:{},{}:{},{},{}",
        sparse(reliability_code(qos.reliability), DEFAULT_RELIABILITY),
        sparse(durability_code(qos.durability), DEFAULT_DURABILITY),
        sparse(history_code(qos.history), DEFAULT_HISTORY),
        sparse(qos.depth as u64, DEFAULT_DEPTH),
        secs(qos.deadline),
        nanos(qos.deadline),
        secs(qos.lifespan),
        nanos(qos.lifespan),
        sparse(liveliness_code(qos.liveliness), DEFAULT_LIVELINESS),
        secs(qos.liveliness_lease_duration),
        nanos(qos.liveliness_lease_duration),
    )
}
