//! Topic subscriber.

use crate::{
    attachment::Attachment,
    error::{Error, Result},
    keyexpr::{EntityKind, topic_keyexpr},
    node::Node,
    qos::QosMapping,
};
use ferros_core::{
    message::Message,
    msg::TypeSupport,
    qos::Profile,
};
use std::{marker::PhantomData, sync::Arc, time::Duration};
use zenoh::{Wait, sample::Sample};
use zenoh_ext::AdvancedSubscriberBuilderExt;

/// Receives messages of type `T` from one topic.
///
/// Samples land in a bounded FIFO queue sized to the QoS depth. With
/// `KeepLast` semantics a full queue drops the oldest sample to make room,
/// never the newest. Transient-local profiles additionally query the
/// publisher-side cache on startup.
pub struct Subscriber<T> {
    node: Arc<Node>,
    fq_topic_name: String,
    queue: flume::Receiver<Sample>,
    _inner: zenoh_ext::AdvancedSubscriber<()>,
    _token: zenoh::liveliness::LivelinessToken,
    _phantom: PhantomData<T>,
}

impl<T: TypeSupport> Subscriber<T> {
    pub(crate) fn new(node: Arc<Node>, fq_topic_name: &str, qos: Profile) -> Result<Self> {
        QosMapping::warn_unsupported(&qos);

        let type_name = T::type_name();
        let type_hash = T::type_hash();

        let key = topic_keyexpr(
            node.context().domain_id(),
            fq_topic_name,
            type_name,
            type_hash,
        );

        let depth = QosMapping::effective_depth(&qos);
        let (tx, rx) = flume::bounded(depth);
        let overflow = rx.clone();

        let session = node.context().session();
        let inner = session
            .declare_subscriber(&key)
            .callback(move |sample: Sample| {
                // KeepLast: drop the oldest queued sample when full.
                if tx.is_full() {
                    let _ = overflow.try_recv();
                }
                let _ = tx.try_send(sample);
            })
            .history(
                zenoh_ext::HistoryConfig::default().max_samples(QosMapping::replay_depth(&qos)),
            )
            .wait()?;

        let entity_id = node.allocate_entity_id();
        let token_key = node.token_scope().entity_token(
            entity_id,
            EntityKind::Subscriber,
            fq_topic_name,
            type_name,
            type_hash,
            &qos,
        );
        let token = session.liveliness().declare_token(token_key).wait()?;

        Ok(Subscriber {
            node,
            fq_topic_name: fq_topic_name.to_string(),
            queue: rx,
            _inner: inner,
            _token: token,
            _phantom: PhantomData,
        })
    }

    /// The fully qualified topic name.
    pub fn topic_name(&self) -> &str {
        &self.fq_topic_name
    }

    /// The owning node.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    fn convert(sample: Sample) -> Result<Message<T>> {
        let data = T::from_bytes(&sample.payload().to_bytes())?;
        let info = Attachment::decode_or_default(
            sample.attachment().map(|b| b.to_bytes()).as_deref(),
        )
        .into();
        Ok(Message::new(data, info))
    }

    /// Take the next message without blocking; `None` when the queue is
    /// empty.
    pub fn try_recv(&mut self) -> Result<Option<Message<T>>> {
        match self.queue.try_recv() {
            Ok(sample) => Self::convert(sample).map(Some),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Take the next message, waiting up to `timeout`; `None` on timeout.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Message<T>>> {
        match self.queue.recv_timeout(timeout) {
            Ok(sample) => Self::convert(sample).map(Some),
            Err(flume::RecvTimeoutError::Timeout) => Ok(None),
            Err(flume::RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Take the next message, blocking until one arrives.
    pub fn recv_blocking(&mut self) -> Result<Message<T>> {
        let sample = self.queue.recv().map_err(|_| Error::ChannelClosed)?;
        Self::convert(sample)
    }
}

impl<T: TypeSupport> ferros_core::api::RosSubscriber<T> for Subscriber<T> {
    fn topic_name(&self) -> &str {
        Subscriber::topic_name(self)
    }

    fn try_recv(&mut self) -> ferros_core::Result<Option<Message<T>>> {
        Subscriber::try_recv(self).map_err(Into::into)
    }

    fn recv_timeout(&mut self, timeout: Duration) -> ferros_core::Result<Option<Message<T>>> {
        Subscriber::recv_timeout(self, timeout).map_err(Into::into)
    }
}
