//! Topic publisher.

use crate::{
    attachment::{Attachment, generate_gid},
    error::Result,
    keyexpr::{EntityKind, topic_keyexpr},
    node::Node,
    qos::QosMapping,
};
use ferros_core::{message::GID_SIZE, msg::TypeSupport, qos::Profile};
use std::{
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use zenoh::{Wait, bytes::ZBytes};
use zenoh_ext::AdvancedPublisherBuilderExt;

/// Publishes messages of type `T` on one topic.
///
/// Transient-local profiles get a sample cache sized to the QoS depth so
/// late-joining subscribers can query the backlog; volatile profiles cache
/// nothing.
pub struct Publisher<T> {
    node: Arc<Node>,
    fq_topic_name: String,
    inner: zenoh_ext::AdvancedPublisher<'static>,
    gid: [u8; GID_SIZE],
    sequence: AtomicI64,
    _token: zenoh::liveliness::LivelinessToken,
    _phantom: PhantomData<T>,
}

impl<T: TypeSupport> Publisher<T> {
    pub(crate) fn new(node: Arc<Node>, fq_topic_name: &str, qos: Profile) -> Result<Self> {
        QosMapping::warn_unsupported(&qos);

        let type_name = T::type_name();
        let type_hash = T::type_hash();

        let key = zenoh::key_expr::KeyExpr::try_from(topic_keyexpr(
            node.context().domain_id(),
            fq_topic_name,
            type_name,
            type_hash,
        ))?;

        let session = node.context().session();
        let inner = session
            .declare_publisher(key)
            .congestion_control(QosMapping::congestion_control(&qos))
            .cache(zenoh_ext::CacheConfig::default().max_samples(QosMapping::replay_depth(&qos)))
            .wait()?;

        let entity_id = node.allocate_entity_id();
        let token_key = node.token_scope().entity_token(
            entity_id,
            EntityKind::Publisher,
            fq_topic_name,
            type_name,
            type_hash,
            &qos,
        );
        let token = session.liveliness().declare_token(token_key).wait()?;

        Ok(Publisher {
            node,
            fq_topic_name: fq_topic_name.to_string(),
            inner,
            gid: generate_gid(),
            sequence: AtomicI64::new(0),
            _token: token,
            _phantom: PhantomData,
        })
    }

    /// The fully qualified topic name.
    pub fn topic_name(&self) -> &str {
        &self.fq_topic_name
    }

    /// The publisher GID.
    pub fn gid(&self) -> &[u8; GID_SIZE] {
        &self.gid
    }

    /// The owning node.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Publish one message.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the Zenoh put fails.
    pub fn send(&self, msg: &T) -> Result<()> {
        let payload = msg.to_bytes()?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let attachment = Attachment::now(seq, self.gid).encode();

        self.inner
            .put(payload)
            .attachment(ZBytes::from(attachment.to_vec()))
            .wait()?;
        Ok(())
    }
}

impl<T: TypeSupport> ferros_core::api::RosPublisher<T> for Publisher<T> {
    fn topic_name(&self) -> &str {
        Publisher::topic_name(self)
    }

    fn send(&self, msg: &T) -> ferros_core::Result<()> {
        Publisher::send(self, msg).map_err(Into::into)
    }
}
