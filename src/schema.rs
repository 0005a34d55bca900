//! Schema types for describing provider, resource and data source structure.
//!
//! Schemas are plain data handed to the host: it uses them to decode
//! configuration, diff state and redact sensitive values. The provider also
//! uses them locally for [validation](crate::validation) and
//! [planning](crate::plan).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A boolean value.
    Bool,
    /// An unordered set of objects that share one nested attribute layout.
    SetNested(NestedObject),
}

/// The attributes of each element in a nested collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NestedObject {
    /// Attributes of one element, keyed by name.
    pub attributes: BTreeMap<String, Attribute>,
}

impl NestedObject {
    /// Create an empty nested object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to the nested object.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }
}

/// Where an attribute's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// Filled in by the provider.
    pub computed: bool,
    /// Hidden from host output.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Flags for a computed attribute (read-only, set by provider).
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Flags for an optional+computed attribute (can be set, otherwise the provider fills it in).
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }

    /// True when the value only ever comes from the provider.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// One attribute of a schema or nested object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Whether the value is configured, computed, or both.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Description shown in generated docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// For computed attributes: keep the prior state value when planning an
    /// update instead of marking the value unknown.
    #[serde(default)]
    pub use_state_for_unknown: bool,
}

impl Attribute {
    /// An attribute with no description.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            use_state_for_unknown: false,
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Create a computed string attribute.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Create a computed int64 attribute.
    pub fn computed_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::computed())
    }

    /// Create an optional+computed bool attribute.
    pub fn optional_computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional_computed())
    }

    /// Create a computed bool attribute.
    pub fn computed_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::computed())
    }

    /// Create a required set of nested objects.
    pub fn required_set_nested(nested: NestedObject) -> Self {
        Self::new(AttributeType::SetNested(nested), AttributeFlags::required())
    }

    /// Describe the attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Keep the prior state value when planning an update.
    pub fn with_use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    /// Hide the value in host output.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }
}

/// Schema for a resource, data source, or the provider configuration block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// Schema version recorded alongside state.
    #[serde(default)]
    pub version: u64,
    /// Description shown in generated docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level attributes keyed by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// An empty schema at version 0.
    pub fn v0() -> Self {
        Self::default()
    }

    /// Add a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Describe the schema.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Every schema the provider publishes, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// The provider configuration block.
    #[serde(default)]
    pub provider: Schema,
    /// Resource schemas.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Data source schemas.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// An empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `schema` for the provider configuration block.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Register a resource type.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Register a data source type.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// How the host treats a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Fails the operation.
    Error,
    /// Reported without failing the operation.
    Warning,
}

/// A user-facing problem report, optionally tied to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Whether the host fails the operation or only reports it.
    pub severity: DiagnosticSeverity,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation, including how to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the offending attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic; the host fails the operation.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Attach a longer explanation.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Point the diagnostic at an attribute path such as `attributes.0.attr_value`.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.is_computed_only());

        let computed = AttributeFlags::computed();
        assert!(computed.computed);
        assert!(computed.is_computed_only());

        let optional = AttributeFlags::optional();
        assert!(optional.optional);
        assert!(!optional.is_computed_only());

        let optional_computed = AttributeFlags::optional_computed();
        assert!(optional_computed.optional);
        assert!(optional_computed.computed);
        assert!(!optional_computed.is_computed_only());
    }

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::computed_string()
            .with_description("The ID of the object.")
            .with_use_state_for_unknown();

        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.computed);
        assert!(attr.use_state_for_unknown);
        assert_eq!(attr.description.as_deref(), Some("The ID of the object."));

        let secret = Attribute::optional_string().sensitive();
        assert!(secret.flags.sensitive);
    }

    #[test]
    fn test_set_nested_attribute() {
        let attr = Attribute::required_set_nested(
            NestedObject::new()
                .with_attribute("attr_type_id", Attribute::required_string())
                .with_attribute("attr_value", Attribute::required_string()),
        );

        match &attr.attr_type {
            AttributeType::SetNested(nested) => {
                assert_eq!(nested.attributes.len(), 2);
                assert!(nested.attributes["attr_type_id"].flags.required);
            },
            other => panic!("unexpected type {:?}", other),
        }
    }

    #[test]
    fn test_provider_schema() {
        let provider_schema = ProviderSchema::new()
            .with_provider_config(
                Schema::v0().with_attribute("password", Attribute::optional_string().sensitive()),
            )
            .with_resource(
                "jiraassets_object",
                Schema::v0().with_attribute("type_id", Attribute::required_string()),
            )
            .with_data_source(
                "jiraassets_object_schema",
                Schema::v0().with_attribute("id", Attribute::required_string()),
            );

        assert!(provider_schema.provider.attributes["password"].flags.sensitive);
        assert!(provider_schema.resources.contains_key("jiraassets_object"));
        assert!(provider_schema
            .data_sources
            .contains_key("jiraassets_object_schema"));
    }

    #[test]
    fn test_schema_serializes_flags_flat() {
        let schema = Schema::v0().with_attribute("id", Attribute::computed_string());
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["attributes"]["id"]["type"], "string");
        assert_eq!(json["attributes"]["id"]["computed"], true);
        assert_eq!(json["attributes"]["id"]["required"], false);
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Missing Assets API User")
            .with_detail("Set the user value in the configuration")
            .with_attribute("user");

        assert!(err.is_error());
        assert_eq!(err.summary, "Missing Assets API User");
        assert_eq!(err.attribute, Some("user".to_string()));

        let warning = Diagnostic {
            severity: DiagnosticSeverity::Warning,
            ..err
        };
        assert!(!warning.is_error());
        assert_eq!(
            serde_json::to_value(&warning).unwrap()["severity"],
            "warning"
        );
    }
}
