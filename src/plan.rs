//! Schema-driven planning.
//!
//! Computes the planned state and attribute changes for a resource from its
//! [`Schema`], the prior state and the proposed configuration:
//!
//! - computed-only attributes are unknown (null) on create; on update they
//!   keep the prior value when marked `use_state_for_unknown`, otherwise they
//!   become unknown again
//! - optional+computed attributes left unset carry the prior value
//! - sets compare without regard to element order
//! - an update with no configurable changes plans the prior state unchanged

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeType, Schema};

/// One top-level attribute that differs between prior and planned state.
///
/// `before` is `None` when the attribute is being set for the first time and
/// `after` is `None` when it is being cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute name.
    pub path: String,
    /// Prior value.
    pub before: Option<Value>,
    /// Planned value.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// The attribute goes from unset to `value`.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(value),
        }
    }

    /// The attribute goes from `value` to unset.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(value),
            after: None,
        }
    }

    /// The attribute changes value.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(before),
            after: Some(after),
        }
    }
}

/// Outcome of planning one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the apply step will receive. Null attributes are known only
    /// after apply; a null document means destroy.
    pub planned_state: Value,
    /// Configurable attributes that change.
    pub changes: Vec<AttributeChange>,
    /// Whether the change needs destroy-then-create.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Keep `state` as it is.
    pub fn no_change(state: Value) -> Self {
        Self::with_changes(state, Vec::new(), false)
    }

    /// Move to `planned_state` through `changes`.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// Plan a resource change.
///
/// `prior` is `None` for a create; a null `proposed` plans a destroy.
pub fn plan_resource(
    schema: &Schema,
    prior: Option<&Value>,
    proposed: &Value,
) -> Result<PlanResult, ProviderError> {
    let prior = prior.filter(|p| !p.is_null());

    if proposed.is_null() {
        return Ok(plan_destroy(schema, prior));
    }

    let proposed_obj = as_object(proposed, "proposed state")?;
    let prior_obj = prior.map(|p| as_object(p, "prior state")).transpose()?;

    let mut planned = proposed_obj.clone();
    let mut changes = Vec::new();

    for (name, attr) in &schema.attributes {
        let before = prior_obj.and_then(|p| p.get(name)).unwrap_or(&Value::Null);
        let after = proposed_obj.get(name).unwrap_or(&Value::Null);

        if attr.flags.is_computed_only() {
            let value = match prior_obj {
                Some(_) if attr.use_state_for_unknown => before.clone(),
                _ => Value::Null,
            };
            planned.insert(name.clone(), value);
            continue;
        }

        if attr.flags.computed && after.is_null() {
            planned.insert(name.clone(), before.clone());
            continue;
        }

        if let Some(change) = diff(name, attr, before, after) {
            changes.push(change);
        }
    }

    match prior {
        Some(prior) if changes.is_empty() => Ok(PlanResult::no_change(prior.clone())),
        _ => Ok(PlanResult::with_changes(Value::Object(planned), changes, false)),
    }
}

fn plan_destroy(schema: &Schema, prior: Option<&Value>) -> PlanResult {
    let changes = schema
        .attributes
        .iter()
        .filter(|(_, attr)| !attr.flags.is_computed_only())
        .filter_map(|(name, _)| {
            let value = prior?.get(name)?;
            (!value.is_null()).then(|| AttributeChange::removed(name.clone(), value.clone()))
        })
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn diff(name: &str, attr: &Attribute, before: &Value, after: &Value) -> Option<AttributeChange> {
    if normalize(attr, before) == normalize(attr, after) {
        return None;
    }
    Some(match (before.is_null(), after.is_null()) {
        (true, _) => AttributeChange::added(name, after.clone()),
        (false, true) => AttributeChange::removed(name, before.clone()),
        (false, false) => AttributeChange::modified(name, before.clone(), after.clone()),
    })
}

fn normalize(attr: &Attribute, value: &Value) -> Value {
    match (&attr.attr_type, value) {
        (AttributeType::SetNested(_), Value::Array(items)) => {
            let mut items = items.clone();
            items.sort_by_cached_key(|item| item.to_string());
            items.dedup();
            Value::Array(items)
        },
        _ => value.clone(),
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ProviderError> {
    value
        .as_object()
        .ok_or_else(|| ProviderError::Validation(format!("{} must be an object", what)))
}
