//! `example_interfaces` service types.

use crate::message_type_support;
use ferros_core::msg::ServiceMsg;
use serde::{Deserialize, Serialize};

/// `example_interfaces/srv/AddTwoInts` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTwoIntsRequest {
    /// First addend.
    pub a: i64,
    /// Second addend.
    pub b: i64,
}

/// `example_interfaces/srv/AddTwoInts` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTwoIntsResponse {
    /// The sum `a + b`.
    pub sum: i64,
}

message_type_support!(
    AddTwoIntsRequest,
    "example_interfaces::srv::dds_::AddTwoInts_Request_",
    "RIHS01_e118de6bf5eeb66a2491b5bda11202e7b68f198d6f67922cf30364858239c81a"
);

message_type_support!(
    AddTwoIntsResponse,
    "example_interfaces::srv::dds_::AddTwoInts_Response_",
    "RIHS01_e118de6bf5eeb66a2491b5bda11202e7b68f198d6f67922cf30364858239c81a"
);

/// `example_interfaces/srv/AddTwoInts`.
#[derive(Debug)]
pub struct AddTwoInts;

impl ServiceMsg for AddTwoInts {
    type Request = AddTwoIntsRequest;
    type Response = AddTwoIntsResponse;

    fn type_name() -> &'static str {
        "example_interfaces::srv::dds_::AddTwoInts_"
    }

    fn type_hash() -> &'static str {
        "RIHS01_e118de6bf5eeb66a2491b5bda11202e7b68f198d6f67922cf30364858239c81a"
    }
}
