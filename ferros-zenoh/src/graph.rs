//! Graph discovery cache.
//!
//! Every node and endpoint announces itself with a liveliness token; the
//! cache ingests token put/delete events and answers graph queries (node
//! names, per-topic counts, declared types).

use crate::keyexpr::{EntityKind, LIVELINESS_PREFIX, unmangle};
use std::collections::HashMap;
use zenoh::sample::SampleKind;

/// A discovered node or endpoint.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    /// ROS domain ID.
    pub domain_id: u32,
    /// Zenoh session ID (hex).
    pub session_id: String,
    /// Node ID within its session.
    pub node_id: u32,
    /// Entity ID within its node (equals `node_id` for nodes).
    pub entity_id: u32,
    /// What the entity is.
    pub kind: EntityKind,
    /// SROS enclave, empty if unset.
    pub enclave: String,
    /// Node namespace, empty for the root namespace.
    pub namespace: String,
    /// Node name.
    pub node_name: String,
    /// Fully qualified topic/service name (endpoints only).
    pub topic_name: Option<String>,
    /// DDS type name (endpoints only).
    pub type_name: Option<String>,
    /// RIHS01 type hash (endpoints only).
    pub type_hash: Option<String>,
}

impl EntityInfo {
    /// Parse a liveliness token key expression.
    ///
    /// Node tokens have 9 chunks, endpoint tokens 13 (topic, type, hash and
    /// QoS appended). Anything else is not ours.
    fn parse(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() < 9 || parts[0] != LIVELINESS_PREFIX {
            return None;
        }

        let kind = EntityKind::parse(parts[5])?;
        let mut info = Self {
            domain_id: parts[1].parse().ok()?,
            session_id: parts[2].to_string(),
            node_id: parts[3].parse().ok()?,
            entity_id: parts[4].parse().ok()?,
            kind,
            enclave: unmangle(parts[6]),
            namespace: unmangle(parts[7]),
            node_name: parts[8].to_string(),
            topic_name: None,
            type_name: None,
            type_hash: None,
        };

        if kind != EntityKind::Node && parts.len() >= 12 {
            info.topic_name = Some(unmangle(parts[9]));
            info.type_name = Some(parts[10].to_string());
            info.type_hash = Some(parts[11].to_string());
        }

        Some(info)
    }

    /// The fully qualified name of the owning node.
    pub fn node_fqn(&self) -> String {
        if self.namespace.is_empty() {
            format!("/{}", self.node_name)
        } else {
            format!("{}/{}", self.namespace, self.node_name)
        }
    }
}

/// Cache of every currently-alive entity in the graph.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    entities: HashMap<String, EntityInfo>,
}

impl GraphCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one liveliness event.
    pub fn handle_token(&mut self, token: &str, kind: SampleKind) {
        match kind {
            SampleKind::Put => {
                if let Some(info) = EntityInfo::parse(token) {
                    self.entities.insert(token.to_string(), info);
                } else {
                    tracing::debug!("ignoring unrecognized liveliness token '{token}'");
                }
            }
            SampleKind::Delete => {
                self.entities.remove(token);
            }
        }
    }

    /// Fully qualified names of every known node.
    pub fn node_names(&self) -> Vec<String> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Node)
            .map(EntityInfo::node_fqn)
            .collect()
    }

    /// Number of publishers currently declared on `topic`.
    pub fn count_publishers(&self, topic: &str) -> usize {
        self.count(EntityKind::Publisher, topic)
    }

    /// Number of subscribers currently declared on `topic`.
    pub fn count_subscribers(&self, topic: &str) -> usize {
        self.count(EntityKind::Subscriber, topic)
    }

    fn count(&self, kind: EntityKind, topic: &str) -> usize {
        self.entities
            .values()
            .filter(|e| e.kind == kind && e.topic_name.as_deref() == Some(topic))
            .count()
    }

    /// The DDS type name declared on `topic` by any endpoint, if known.
    pub fn topic_type(&self, topic: &str) -> Option<&str> {
        self.entities
            .values()
            .find(|e| e.topic_name.as_deref() == Some(topic))
            .and_then(|e| e.type_name.as_deref())
    }

    /// True when a service server is alive on `service_name`.
    pub fn service_available(&self, service_name: &str) -> bool {
        self.entities.values().any(|e| {
            e.kind == EntityKind::ServiceServer && e.topic_name.as_deref() == Some(service_name)
        })
    }

    /// Number of known entities (nodes and endpoints).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when nothing has been discovered yet.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTENER_NODE: &str = "@ros2_lv/2/aac3178e146ba6f1fc6e6a4085e77f21/0/0/NN/%/%/listener";
    const LISTENER_SUB: &str = "@ros2_lv/2/aac3178e146ba6f1fc6e6a4085e77f21/0/10/MS/%/%/listener/%chatter/std_msgs::msg::dds_::String_/RIHS01_df668c740482bbd48fb39d76a70dfd4bd59db1288021743503259e948f6b1a18/::,10:,:,:,,";
    const TALKER_PUB: &str = "@ros2_lv/2/8b20917502ee955ac4476e0266340d5c/0/10/MP/%/%/talker/%chatter/std_msgs::msg::dds_::String_/RIHS01_df668c740482bbd48fb39d76a70dfd4bd59db1288021743503259e948f6b1a18/::,7:,:,:,,";
    const ADD_SRV: &str = "@ros2_lv/2/f9980ee0495eaafb3e38f0d19e2eae12/0/10/SS/%/%/add_two_ints_server/%add_two_ints/example_interfaces::srv::dds_::AddTwoInts_/RIHS01_e118de6bf5eeb66a2491b5bda11202e7b68f198d6f67922cf30364858239c81a/::,10:,:,:,,";

    #[test]
    fn parse_node_token() {
        let info = EntityInfo::parse(LISTENER_NODE).unwrap();
        assert_eq!(info.domain_id, 2);
        assert_eq!(info.session_id, "aac3178e146ba6f1fc6e6a4085e77f21");
        assert_eq!(info.kind, EntityKind::Node);
        assert_eq!(info.namespace, "");
        assert_eq!(info.node_fqn(), "/listener");
        assert!(info.topic_name.is_none());
    }

    #[test]
    fn parse_endpoint_token() {
        let info = EntityInfo::parse(TALKER_PUB).unwrap();
        assert_eq!(info.kind, EntityKind::Publisher);
        assert_eq!(info.entity_id, 10);
        assert_eq!(info.node_name, "talker");
        assert_eq!(info.topic_name.as_deref(), Some("/chatter"));
        assert_eq!(
            info.type_name.as_deref(),
            Some("std_msgs::msg::dds_::String_")
        );
        assert!(info.type_hash.unwrap().starts_with("RIHS01_"));
    }

    #[test]
    fn parse_namespaced_node() {
        let info = EntityInfo::parse("@ros2_lv/0/s/1/1/NN/%/%robot1/driver").unwrap();
        assert_eq!(info.namespace, "/robot1");
        assert_eq!(info.node_fqn(), "/robot1/driver");
    }

    #[test]
    fn rejects_foreign_tokens() {
        assert!(EntityInfo::parse("@other/0/s/0/0/NN/%/%/n").is_none());
        assert!(EntityInfo::parse("@ros2_lv/0/s").is_none());
        assert!(EntityInfo::parse("@ros2_lv/0/s/0/0/ZZ/%/%/n").is_none());
        assert!(EntityInfo::parse("@ros2_lv/nan/s/0/0/NN/%/%/n").is_none());
    }

    #[test]
    fn put_then_delete() {
        let mut cache = GraphCache::new();
        cache.handle_token(LISTENER_NODE, SampleKind::Put);
        assert_eq!(cache.node_names(), vec!["/listener".to_string()]);

        cache.handle_token(LISTENER_NODE, SampleKind::Delete);
        assert!(cache.is_empty());
    }

    #[test]
    fn topic_queries() {
        let mut cache = GraphCache::new();
        cache.handle_token(TALKER_PUB, SampleKind::Put);
        cache.handle_token(LISTENER_SUB, SampleKind::Put);

        assert_eq!(cache.count_publishers("/chatter"), 1);
        assert_eq!(cache.count_subscribers("/chatter"), 1);
        assert_eq!(cache.count_publishers("/elsewhere"), 0);
        assert_eq!(
            cache.topic_type("/chatter"),
            Some("std_msgs::msg::dds_::String_")
        );
    }

    #[test]
    fn service_availability_tracks_liveliness() {
        let mut cache = GraphCache::new();
        assert!(!cache.service_available("/add_two_ints"));

        cache.handle_token(ADD_SRV, SampleKind::Put);
        assert!(cache.service_available("/add_two_ints"));

        cache.handle_token(ADD_SRV, SampleKind::Delete);
        assert!(!cache.service_available("/add_two_ints"));
    }
}
