//! Message and service traits.

use crate::error::Result;

/// Trait for ROS2 message types the transport can move across the wire.
///
/// Implementations provide CDR serialization plus the identity used for
/// discovery: the DDS type name (e.g. `std_msgs::msg::dds_::String_`) and
/// the RIHS01 type hash.
pub trait TypeSupport: 'static + Send + Sync {
    /// Serialize this message to CDR-encoded bytes, including the 4-byte
    /// encapsulation header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if encoding fails.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize a message from CDR-encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if decoding fails.
    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;

    /// The type name in DDS format, e.g. `"std_msgs::msg::dds_::String_"`.
    fn type_name() -> &'static str;

    /// The RIHS01 type hash, `RIHS01_<64 hex chars>`.
    fn type_hash() -> &'static str;
}

/// Trait for ROS2 service types: a request/response message pair.
pub trait ServiceMsg: 'static + Send + Sync {
    /// Request message type.
    type Request: TypeSupport;

    /// Response message type.
    type Response: TypeSupport;

    /// The service type name in DDS format, e.g.
    /// `"example_interfaces::srv::dds_::AddTwoInts_"`.
    fn type_name() -> &'static str;

    /// The RIHS01 type hash of the service type.
    fn type_hash() -> &'static str;
}
