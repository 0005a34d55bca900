//! Wire models for the Jira Assets REST API.
//!
//! Field names follow the API's camelCase JSON. Response structs default
//! every field so that sparse payloads still decode.

use serde::{Deserialize, Serialize};

/// Request body for creating or updating an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPayload {
    /// Object type the object belongs to.
    pub object_type_id: String,
    /// Attribute values to set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ObjectPayloadAttribute>,
    /// Whether the object has an avatar.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_avatar: bool,
    /// UUID of a previously uploaded avatar.
    #[serde(rename = "avatarUUID", default, skip_serializing_if = "Option::is_none")]
    pub avatar_uuid: Option<String>,
}

/// One attribute in an [`ObjectPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPayloadAttribute {
    /// Attribute type id the values belong to.
    pub object_type_attribute_id: String,
    /// Values of the attribute.
    pub object_attribute_values: Vec<ObjectPayloadAttributeValue>,
}

impl ObjectPayloadAttribute {
    /// An attribute carrying a single value.
    pub fn single(object_type_attribute_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            object_type_attribute_id: object_type_attribute_id.into(),
            object_attribute_values: vec![ObjectPayloadAttributeValue {
                value: value.into(),
            }],
        }
    }
}

/// One value of an [`ObjectPayloadAttribute`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPayloadAttributeValue {
    /// The value, always sent as a string.
    pub value: String,
}

/// An Assets object as returned by create, get and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Object {
    pub workspace_id: String,
    pub global_id: String,
    pub id: String,
    pub label: String,
    pub object_key: String,
    pub created: String,
    pub updated: String,
    pub has_avatar: bool,
    pub object_type: Option<ObjectTypeRef>,
}

/// The object type an [`Object`] belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObjectTypeRef {
    pub id: String,
}

/// One entry of an object's attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectAttribute {
    pub object_type_attribute_id: String,
    pub object_attribute_values: Vec<ObjectAttributeValue>,
}

impl ObjectAttribute {
    /// The first value, which is what a single-valued attribute holds.
    pub fn first_value(&self) -> Option<&str> {
        self.object_attribute_values
            .first()
            .map(|v| v.value.as_deref().unwrap_or_default())
    }
}

/// One value of an [`ObjectAttribute`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectAttributeValue {
    /// Raw value; null for some attribute kinds.
    pub value: Option<String>,
}

/// Object schema metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectSchema {
    pub workspace_id: String,
    pub global_id: String,
    pub id: String,
    pub name: String,
    pub object_schema_key: String,
    pub status: String,
    pub description: Option<String>,
    pub created: String,
    pub updated: String,
    pub object_count: i64,
    pub object_type_count: i64,
    pub can_manage: bool,
    pub id_as_int: i64,
}
