//! Schema validation helpers.
//!
//! Validates a `serde_json::Value` configuration against a [`Schema`] and
//! reports every problem as a [`Diagnostic`], so the operator sees all of
//! them at once.
//!
//! # Example
//!
//! ```
//! use jiraassets_provider::schema::{Attribute, Schema};
//! use jiraassets_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("type_id", Attribute::required_string())
//!     .with_attribute("has_avatar", Attribute::optional_computed_bool());
//!
//! assert!(validate(&schema, &json!({"type_id": "117"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"has_avatar": "yes"}));
//! assert_eq!(diagnostics.len(), 2);
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validate a JSON value against a schema.
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (the provider sets these)
/// - Attribute types must match the schema, recursively for nested sets
///
/// An empty result means the value is valid.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    match value {
        Value::Object(obj) => validate_attributes(&schema.attributes, obj, "", &mut diagnostics),
        // An absent configuration block is validated as an empty one.
        Value::Null => {
            validate_attributes(&schema.attributes, &Default::default(), "", &mut diagnostics)
        },
        other => diagnostics.push(
            Diagnostic::error("Expected object").with_detail(format!("Got {}", value_type_name(other))),
        ),
    }
    diagnostics
}

fn validate_attributes(
    attributes: &BTreeMap<String, Attribute>,
    obj: &serde_json::Map<String, Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, attr) in attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::SetNested(nested) => {
            let Some(items) = value.as_array() else {
                diagnostics.push(type_error(path, "set", value));
                return;
            };
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                match item.as_object() {
                    Some(obj) => {
                        validate_attributes(&nested.attributes, obj, &item_path, diagnostics)
                    },
                    None => diagnostics.push(type_error(&item_path, "object", item)),
                }
            }
        },
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.as_u64().is_some_and(|u| u <= i64::MAX as u64),
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for '{}'", path))
        .with_detail(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        ))
        .with_attribute(path)
}
