//! Endpoint registry.
//!
//! Tracks every endpoint a runtime has registered, keyed by fully qualified
//! topic/service name, and rejects conflicting registrations before the
//! transport is touched. A rejected registration leaves the registry exactly
//! as it was.

use crate::{
    error::{Error, Result},
    qos::Profile,
};
use std::collections::HashMap;

/// Identifier of a registered endpoint, unique within one registry.
pub type EndpointId = u64;

/// The role of a registered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Message publisher.
    Publisher,
    /// Message subscriber.
    Subscriber,
    /// Service server.
    Service,
}

#[derive(Debug, Clone)]
struct EndpointEntry {
    id: EndpointId,
    kind: EndpointKind,
    qos: Profile,
}

#[derive(Debug, Clone)]
struct TopicRecord {
    type_name: String,
    endpoints: Vec<EndpointEntry>,
}

/// Registry of the endpoints owned by one runtime.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    topics: HashMap<String, TopicRecord>,
    next_id: EndpointId,
}

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint on `topic`.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] when the topic already carries a different
    ///   message type.
    /// - [`Error::QosIncompatible`] when a subscriber request cannot be
    ///   satisfied by an already-registered publisher offer on the same
    ///   topic (or vice versa).
    pub fn register(
        &mut self,
        kind: EndpointKind,
        topic: &str,
        type_name: &str,
        qos: &Profile,
    ) -> Result<EndpointId> {
        if let Some(record) = self.topics.get(topic) {
            if record.type_name != type_name {
                return Err(Error::TypeMismatch {
                    topic: topic.to_string(),
                    registered: record.type_name.clone(),
                    requested: type_name.to_string(),
                });
            }
            Self::check_qos(topic, record, kind, qos)?;
        }

        let id = self.next_id;
        self.next_id += 1;

        tracing::debug!("registering {kind:?} #{id} on '{topic}' ({type_name})");

        let record = self.topics.entry(topic.to_string()).or_insert(TopicRecord {
            type_name: type_name.to_string(),
            endpoints: Vec::new(),
        });
        record.endpoints.push(EndpointEntry {
            id,
            kind,
            qos: qos.clone(),
        });

        Ok(id)
    }

    /// Check a new endpoint's QoS against every existing counterpart on the
    /// topic: subscriber requests against publisher offers, in whichever
    /// order the two sides are registered.
    fn check_qos(
        topic: &str,
        record: &TopicRecord,
        kind: EndpointKind,
        qos: &Profile,
    ) -> Result<()> {
        for existing in &record.endpoints {
            let violated = match (kind, existing.kind) {
                (EndpointKind::Subscriber, EndpointKind::Publisher) => {
                    qos.incompatibility_with_offer(&existing.qos)
                }
                (EndpointKind::Publisher, EndpointKind::Subscriber) => {
                    existing.qos.incompatibility_with_offer(qos)
                }
                _ => None,
            };
            if let Some(policy) = violated {
                return Err(Error::QosIncompatible {
                    topic: topic.to_string(),
                    policy,
                });
            }
        }
        Ok(())
    }

    /// Remove an endpoint. Returns `true` when the id was present.
    pub fn deregister(&mut self, id: EndpointId) -> bool {
        let topic = self.topics.iter().find_map(|(topic, record)| {
            record
                .endpoints
                .iter()
                .any(|e| e.id == id)
                .then(|| topic.clone())
        });
        let Some(topic) = topic else {
            return false;
        };

        if let Some(record) = self.topics.get_mut(&topic) {
            record.endpoints.retain(|e| e.id != id);
            if record.endpoints.is_empty() {
                self.topics.remove(&topic);
            }
        }
        true
    }

    /// The message type recorded for `topic`, if any endpoint is registered
    /// on it.
    pub fn topic_type(&self, topic: &str) -> Option<&str> {
        self.topics.get(topic).map(|r| r.type_name.as_str())
    }

    /// Number of endpoints registered on `topic`.
    pub fn endpoint_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |r| r.endpoints.len())
    }

    /// Total number of registered endpoints.
    pub fn len(&self) -> usize {
        self.topics.values().map(|r| r.endpoints.len()).sum()
    }

    /// True when no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRING_TYPE: &str = "std_msgs::msg::dds_::String_";
    const INT_TYPE: &str = "std_msgs::msg::dds_::Int64_";

    #[test]
    fn register_and_count() {
        let mut reg = EndpointRegistry::new();
        let a = reg
            .register(
                EndpointKind::Publisher,
                "/chatter",
                STRING_TYPE,
                &Profile::default(),
            )
            .unwrap();
        let b = reg
            .register(
                EndpointKind::Subscriber,
                "/chatter",
                STRING_TYPE,
                &Profile::default(),
            )
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(reg.endpoint_count("/chatter"), 2);
        assert_eq!(reg.topic_type("/chatter"), Some(STRING_TYPE));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let mut reg = EndpointRegistry::new();
        reg.register(
            EndpointKind::Publisher,
            "/chatter",
            STRING_TYPE,
            &Profile::default(),
        )
        .unwrap();

        let err = reg
            .register(
                EndpointKind::Subscriber,
                "/chatter",
                INT_TYPE,
                &Profile::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn rejection_leaves_registry_untouched() {
        let mut reg = EndpointRegistry::new();
        reg.register(
            EndpointKind::Publisher,
            "/chatter",
            STRING_TYPE,
            &Profile::default(),
        )
        .unwrap();

        let _ = reg.register(
            EndpointKind::Subscriber,
            "/chatter",
            INT_TYPE,
            &Profile::default(),
        );

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.topic_type("/chatter"), Some(STRING_TYPE));

        // The surviving record still accepts compatible registrations.
        reg.register(
            EndpointKind::Subscriber,
            "/chatter",
            STRING_TYPE,
            &Profile::default(),
        )
        .unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn subscriber_qos_checked_against_publisher_offer() {
        let mut reg = EndpointRegistry::new();
        reg.register(
            EndpointKind::Publisher,
            "/scan",
            STRING_TYPE,
            &Profile::sensor_data(),
        )
        .unwrap();

        let err = reg
            .register(
                EndpointKind::Subscriber,
                "/scan",
                STRING_TYPE,
                &Profile::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::QosIncompatible { .. }));
    }

    #[test]
    fn publisher_offer_checked_against_existing_subscribers() {
        let mut reg = EndpointRegistry::new();
        reg.register(
            EndpointKind::Subscriber,
            "/scan",
            STRING_TYPE,
            &Profile::default(),
        )
        .unwrap();

        let err = reg
            .register(
                EndpointKind::Publisher,
                "/scan",
                STRING_TYPE,
                &Profile::sensor_data(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::QosIncompatible { .. }));
    }

    #[test]
    fn deregister_frees_the_topic() {
        let mut reg = EndpointRegistry::new();
        let id = reg
            .register(
                EndpointKind::Publisher,
                "/chatter",
                STRING_TYPE,
                &Profile::default(),
            )
            .unwrap();

        assert!(reg.deregister(id));
        assert!(!reg.deregister(id));
        assert!(reg.is_empty());

        // A different type is fine once the topic is free again.
        reg.register(
            EndpointKind::Publisher,
            "/chatter",
            INT_TYPE,
            &Profile::default(),
        )
        .unwrap();
    }
}
