//! Hand-maintained ROS2 interface types for the ferros stack.
//!
//! Message structs here mirror their `rosidl` definitions field-for-field so
//! the CDR wire format matches what DDS and `rmw_zenoh_cpp` nodes produce.
//! Each type carries its DDS type name and the published RIHS01 hash; only
//! interfaces whose hash is known from the rmw_zenoh design documentation
//! are shipped, since a wrong hash silently breaks discovery against real
//! nodes.
//!
//! Application-defined types implement [`TypeSupport`] through
//! [`message_type_support!`]:
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Temperature {
//!     pub celsius: f64,
//! }
//!
//! ferros_msg::message_type_support!(
//!     Temperature,
//!     "my_pkg::msg::dds_::Temperature_",
//!     "RIHS01_0000000000000000000000000000000000000000000000000000000000000000"
//! );
//! ```

pub mod cdr;
pub mod example_interfaces;
pub mod std_msgs;

pub use ferros_core::msg::{ServiceMsg, TypeSupport};

/// Implement [`TypeSupport`] for a serde-serializable message struct.
///
/// Takes the message type, its DDS type name, and its RIHS01 hash string.
#[macro_export]
macro_rules! message_type_support {
    ($ty:ty, $dds_name:expr, $hash:expr) => {
        impl $crate::TypeSupport for $ty {
            fn to_bytes(&self) -> ::ferros_core::error::Result<Vec<u8>> {
                $crate::cdr::encode(self)
            }

            fn from_bytes(bytes: &[u8]) -> ::ferros_core::error::Result<Self> {
                $crate::cdr::decode(bytes)
            }

            fn type_name() -> &'static str {
                $dds_name
            }

            fn type_hash() -> &'static str {
                $hash
            }
        }
    };
}
