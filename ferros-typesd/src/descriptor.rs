//! Hashed type description JSON schema.
//!
//! These structures mirror the `HashedTypeDescription` JSON files emitted
//! by `rosidl_generator_type_description` (kilted) next to every installed
//! `.msg`/`.srv`/`.action` definition, and the
//! `type_description_interfaces` messages they serialize.

use serde::{Deserialize, Serialize};

/// Top-level content of a `<Type>.json` description file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashedTypeDescription {
    /// The full type description message.
    pub type_description_msg: TypeDescriptionMsg,
    /// RIHS01 hashes for the described type and every referenced type.
    pub type_hashes: Vec<TypeNameAndHash>,
}

impl HashedTypeDescription {
    /// The RIHS01 hash recorded for `type_name`, if present.
    pub fn hash_for(&self, type_name: &str) -> Option<&str> {
        self.type_hashes
            .iter()
            .find(|th| th.type_name == type_name)
            .map(|th| th.hash_string.as_str())
    }
}

/// A `(type name, RIHS01 hash)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeNameAndHash {
    /// Fully qualified type name, e.g. `std_msgs/msg/String`.
    pub type_name: String,
    /// `RIHS01_<64 hex chars>`.
    pub hash_string: String,
}

/// A type description together with every type it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptionMsg {
    /// The described type.
    pub type_description: IndividualTypeDescription,
    /// Transitively referenced types.
    pub referenced_type_descriptions: Vec<IndividualTypeDescription>,
}

/// Description of a single type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndividualTypeDescription {
    /// Fully qualified type name.
    pub type_name: String,
    /// The type's fields, in declaration order.
    pub fields: Vec<Field>,
}

/// One field of a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type information.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Default value, when the definition declares one.
    pub default_value: Option<String>,
}

/// Field type information, using the `FieldType.msg` constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldType {
    /// Type id constant from `type_description_interfaces/msg/FieldType`.
    pub type_id: u8,
    /// Array/sequence capacity, 0 when not applicable.
    pub capacity: u64,
    /// String capacity, 0 when not applicable.
    pub string_capacity: u64,
    /// Referenced type name for nested types, empty otherwise.
    pub nested_type_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRING_JSON: &str = r#"{
        "type_description_msg": {
            "type_description": {
                "type_name": "std_msgs/msg/String",
                "fields": [
                    {
                        "name": "data",
                        "type": {
                            "type_id": 17,
                            "capacity": 0,
                            "string_capacity": 0,
                            "nested_type_name": ""
                        },
                        "default_value": null
                    }
                ]
            },
            "referenced_type_descriptions": []
        },
        "type_hashes": [
            {
                "type_name": "std_msgs/msg/String",
                "hash_string": "RIHS01_df668c740482bbd48fb39d76a70dfd4bd59db1288021743503259e948f6b1a18"
            }
        ]
    }"#;

    #[test]
    fn parses_a_description_file() {
        let desc: HashedTypeDescription = serde_json::from_str(STRING_JSON).unwrap();
        assert_eq!(
            desc.type_description_msg.type_description.type_name,
            "std_msgs/msg/String"
        );
        assert_eq!(desc.type_description_msg.type_description.fields.len(), 1);
        assert!(
            desc.hash_for("std_msgs/msg/String")
                .unwrap()
                .starts_with("RIHS01_")
        );
        assert!(desc.hash_for("std_msgs/msg/Other").is_none());
    }

    #[test]
    fn serializes_back_to_json() {
        let desc: HashedTypeDescription = serde_json::from_str(STRING_JSON).unwrap();
        let json = serde_json::to_string(&desc.type_description_msg.type_description).unwrap();
        assert!(json.contains("\"type_name\":\"std_msgs/msg/String\""));
        assert!(json.contains("\"type_id\":17"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = STRING_JSON.replace("\"type_hashes\"", "\"type_hashes_x\"");
        assert!(serde_json::from_str::<HashedTypeDescription>(&json).is_err());
    }
}
