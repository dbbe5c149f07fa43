//! `std_msgs` message types.

use crate::message_type_support;
use serde::{Deserialize, Serialize};

/// `std_msgs/msg/String`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct String {
    /// The string payload.
    pub data: std::string::String,
}

message_type_support!(
    String,
    "std_msgs::msg::dds_::String_",
    "RIHS01_df668c740482bbd48fb39d76a70dfd4bd59db1288021743503259e948f6b1a18"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeSupport;

    #[test]
    fn string_identity() {
        assert_eq!(String::type_name(), "std_msgs::msg::dds_::String_");
        assert!(String::type_hash().starts_with("RIHS01_"));
        assert_eq!(String::type_hash().len(), "RIHS01_".len() + 64);
    }

    #[test]
    fn string_wire_format() {
        let msg = String {
            data: "hi".to_string(),
        };
        let bytes = msg.to_bytes().unwrap();
        // header + u32 length (3, includes NUL) + "hi\0"
        assert_eq!(
            bytes,
            vec![0x00, 0x01, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00]
        );

        let decoded = String::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }
}
