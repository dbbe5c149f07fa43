//! Service server.
//!
//! A server is a Zenoh queryable on the service key expression. Requests
//! are CDR payloads with the usual 33-byte attachment; the response echoes
//! the client's sequence number and GID so the caller can correlate it.

use crate::{
    attachment::Attachment,
    error::{Error, Result},
    keyexpr::{EntityKind, topic_keyexpr},
    node::Node,
    qos::QosMapping,
};
use ferros_core::{
    msg::{ServiceMsg, TypeSupport},
    qos::Profile,
};
use std::{marker::PhantomData, sync::Arc, time::Duration};
use zenoh::{Wait, bytes::ZBytes, query::Query};

/// An incoming request waiting for its response.
pub struct PendingRequest<T: ServiceMsg> {
    request: T::Request,
    attachment: Attachment,
    query: Query,
    _phantom: PhantomData<T>,
}

impl<T: ServiceMsg> PendingRequest<T> {
    /// The request payload.
    pub fn request(&self) -> &T::Request {
        &self.request
    }

    /// Send the response. Consumes the request so it is answered exactly
    /// once.
    pub fn respond(self, response: T::Response) -> Result<()> {
        let payload = response.to_bytes()?;
        let reply_attachment =
            Attachment::now(self.attachment.sequence_number, self.attachment.gid).encode();

        self.query
            .reply(self.query.key_expr().clone(), payload)
            .attachment(ZBytes::from(reply_attachment.to_vec()))
            .wait()?;
        Ok(())
    }
}

impl<T: ServiceMsg> ferros_core::api::ServiceRequest<T> for PendingRequest<T> {
    fn request(&self) -> &T::Request {
        PendingRequest::request(self)
    }

    fn respond(self, response: T::Response) -> ferros_core::Result<()> {
        PendingRequest::respond(self, response).map_err(Into::into)
    }
}

/// Serves requests for service type `T` on one service name.
pub struct Server<T: ServiceMsg> {
    node: Arc<Node>,
    fq_service_name: String,
    queue: flume::Receiver<Query>,
    _queryable: zenoh::query::Queryable<()>,
    _token: zenoh::liveliness::LivelinessToken,
    _phantom: PhantomData<T>,
}

impl<T: ServiceMsg> Server<T> {
    pub(crate) fn new(node: Arc<Node>, fq_service_name: &str, qos: Profile) -> Result<Self> {
        let type_name = T::type_name();
        let type_hash = T::type_hash();

        let key = topic_keyexpr(
            node.context().domain_id(),
            fq_service_name,
            type_name,
            type_hash,
        );

        let depth = QosMapping::effective_depth(&qos);
        let (tx, rx) = flume::bounded(depth);

        let session = node.context().session();
        let queryable = session
            .declare_queryable(&key)
            .callback(move |query: Query| {
                if tx.try_send(query).is_err() {
                    tracing::warn!("service request queue full, dropping request");
                }
            })
            .wait()?;

        let entity_id = node.allocate_entity_id();
        let token_key = node.token_scope().entity_token(
            entity_id,
            EntityKind::ServiceServer,
            fq_service_name,
            type_name,
            type_hash,
            &qos,
        );
        let token = session.liveliness().declare_token(token_key).wait()?;

        Ok(Server {
            node,
            fq_service_name: fq_service_name.to_string(),
            queue: rx,
            _queryable: queryable,
            _token: token,
            _phantom: PhantomData,
        })
    }

    /// The fully qualified service name.
    pub fn service_name(&self) -> &str {
        &self.fq_service_name
    }

    /// The owning node.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    fn convert(query: Query) -> Result<PendingRequest<T>> {
        let payload = query
            .payload()
            .ok_or_else(|| Error::InvalidAttachment("request without payload".to_string()))?
            .to_bytes();
        let request = T::Request::from_bytes(&payload)?;
        let attachment =
            Attachment::decode_or_default(query.attachment().map(|b| b.to_bytes()).as_deref());

        Ok(PendingRequest {
            request,
            attachment,
            query,
            _phantom: PhantomData,
        })
    }

    /// Take the next pending request without blocking; `None` when the
    /// queue is empty.
    pub fn try_recv(&mut self) -> Result<Option<PendingRequest<T>>> {
        match self.queue.try_recv() {
            Ok(query) => Self::convert(query).map(Some),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Take the next pending request, waiting up to `timeout`; `None` on
    /// timeout.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<PendingRequest<T>>> {
        match self.queue.recv_timeout(timeout) {
            Ok(query) => Self::convert(query).map(Some),
            Err(flume::RecvTimeoutError::Timeout) => Ok(None),
            Err(flume::RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }
}

impl<T: ServiceMsg> ferros_core::api::RosServer<T> for Server<T> {
    type Request = PendingRequest<T>;

    fn service_name(&self) -> &str {
        Server::service_name(self)
    }

    fn try_recv(&mut self) -> ferros_core::Result<Option<PendingRequest<T>>> {
        Server::try_recv(self).map_err(Into::into)
    }
}
