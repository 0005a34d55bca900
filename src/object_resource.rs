//! The `jiraassets_object` resource.
//!
//! Maps a configured object (type id plus a set of attribute values) onto an
//! Assets object. Two behaviours of the Assets API shape this resource:
//!
//! - Updates are partial. Attributes removed from configuration are not
//!   removed from the object; they only drop out of state on the next read.
//! - Read reconciles only attribute type ids already tracked in state. The
//!   API also returns system attributes (key, created, updated) whose type
//!   ids are not known up front, so untracked ids are ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::client::AssetsClient;
use crate::error::ProviderError;
use crate::models::{Object, ObjectAttribute, ObjectPayload, ObjectPayloadAttribute};
use crate::plan::{self, PlanResult};
use crate::schema::{Attribute, Diagnostic, NestedObject, Schema};
use crate::service::ImportedResource;
use crate::validation;

/// Type name of the resource.
pub const OBJECT_RESOURCE: &str = "jiraassets_object";

/// State of a `jiraassets_object` resource. Fields mirror the schema.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectResourceModel {
    pub workspace_id: Option<String>,
    pub global_id: Option<String>,
    pub id: Option<String>,
    pub label: Option<String>,
    pub object_key: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub has_avatar: Option<bool>,
    pub type_id: Option<String>,
    pub attributes: Option<Vec<ObjectAttrModel>>,
    pub avatar_uuid: Option<String>,
}

/// One element of the `attributes` set.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttrModel {
    pub attr_type_id: String,
    pub attr_value: String,
}

impl ObjectResourceModel {
    /// Request body carrying the whole configured attribute set.
    pub fn payload(&self) -> ObjectPayload {
        ObjectPayload {
            object_type_id: self.type_id.clone().unwrap_or_default(),
            attributes: self
                .attributes
                .iter()
                .flatten()
                .map(|a| ObjectPayloadAttribute::single(&a.attr_type_id, &a.attr_value))
                .collect(),
            has_avatar: self.has_avatar.unwrap_or(false),
            avatar_uuid: self.avatar_uuid.clone().filter(|u| !u.is_empty()),
        }
    }

    /// Overwrite server-computed fields from an API response, plus `type_id`
    /// when the response names the object type.
    pub fn apply(&mut self, object: &Object) {
        self.workspace_id = Some(object.workspace_id.clone());
        self.global_id = Some(object.global_id.clone());
        self.id = Some(object.id.clone());
        self.label = Some(object.label.clone());
        self.object_key = Some(object.object_key.clone());
        self.created = Some(object.created.clone());
        self.updated = Some(object.updated.clone());
        self.has_avatar = Some(object.has_avatar);
        if let Some(object_type) = object.object_type.as_ref().filter(|t| !t.id.is_empty()) {
            self.type_id = Some(object_type.id.clone());
        }
    }

    /// Replace tracked attribute values with the remote ones.
    ///
    /// Remote attributes whose type id is not tracked are ignored, and a
    /// tracked attribute missing remotely (or holding no value) drops out.
    pub fn reconcile_attributes(&mut self, remote: &[ObjectAttribute]) {
        let Some(tracked) = self.attributes.take() else {
            return;
        };

        let reconciled = remote
            .iter()
            .filter(|attr| {
                tracked
                    .iter()
                    .any(|t| t.attr_type_id == attr.object_type_attribute_id)
            })
            .filter_map(|attr| {
                attr.first_value().map(|value| ObjectAttrModel {
                    attr_type_id: attr.object_type_attribute_id.clone(),
                    attr_value: value.to_string(),
                })
            })
            .collect();

        self.attributes = Some(reconciled);
    }

    fn require_id(&self) -> Result<&str, ProviderError> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::Validation("object state has no id".to_string()))
    }
}

/// Handler for `jiraassets_object`, bound to a configured client.
pub struct ObjectResource {
    client: Arc<AssetsClient>,
}

impl ObjectResource {
    /// Bind the resource to the provider's shared client.
    pub fn new(client: Arc<AssetsClient>) -> Self {
        Self { client }
    }

    /// Schema of the resource.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("A Jira Assets object resource.")
            .with_attribute(
                "workspace_id",
                Attribute::computed_string()
                    .with_description("The ID of the workspace the object belongs to.")
                    .with_use_state_for_unknown(),
            )
            .with_attribute(
                "global_id",
                Attribute::computed_string()
                    .with_description("The global ID of the object.")
                    .with_use_state_for_unknown(),
            )
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_description("The ID of the object.")
                    .with_use_state_for_unknown(),
            )
            .with_attribute(
                "label",
                Attribute::computed_string()
                    .with_description(
                        "The name of the object, taken from the attribute marked as label for \
                         the object type.",
                    )
                    .with_use_state_for_unknown(),
            )
            .with_attribute(
                "object_key",
                Attribute::computed_string()
                    .with_description("The external identifier for this object.")
                    .with_use_state_for_unknown(),
            )
            .with_attribute("type_id", Attribute::required_string())
            .with_attribute(
                "attributes",
                Attribute::required_set_nested(
                    NestedObject::new()
                        .with_attribute(
                            "attr_type_id",
                            Attribute::required_string()
                                .with_description("The object type attribute the value is for."),
                        )
                        .with_attribute(
                            "attr_value",
                            Attribute::required_string()
                                .with_description("The value of the object attribute."),
                        ),
                )
                .with_description("Attribute values of the object."),
            )
            .with_attribute(
                "created",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("updated", Attribute::computed_string())
            .with_attribute("has_avatar", Attribute::optional_computed_bool())
            .with_attribute(
                "avatar_uuid",
                Attribute::optional_string()
                    .with_description("The UUID as retrieved by uploading an avatar."),
            )
    }

    /// Validate resource configuration against the schema.
    pub fn validate(config: &Value) -> Vec<Diagnostic> {
        validation::validate(&Self::schema(), config)
    }

    /// Plan a create, update or destroy.
    pub fn plan(prior: Option<&Value>, proposed: &Value) -> Result<PlanResult, ProviderError> {
        plan::plan_resource(&Self::schema(), prior, proposed)
    }

    /// Seed state for an import; the host completes it with a read.
    pub fn import(id: &str) -> ImportedResource {
        ImportedResource::new(OBJECT_RESOURCE, json!({ "id": id }))
    }

    /// Create the object and return the fully populated state.
    #[instrument(skip(self, planned), fields(workspace_id = %self.client.workspace_id()))]
    pub async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut state: ObjectResourceModel = serde_json::from_value(planned)?;

        let object = self
            .client
            .create_object(&state.payload())
            .await
            .map_err(|e| ProviderError::api("Error during object creation", e))?;

        state.apply(&object);
        info!(id = %object.id, object_key = %object.object_key, "Created object");
        Ok(serde_json::to_value(state)?)
    }

    /// Refresh state from the object and its attribute list.
    #[instrument(skip(self, current), fields(workspace_id = %self.client.workspace_id()))]
    pub async fn read(&self, current: Value) -> Result<Value, ProviderError> {
        let mut state: ObjectResourceModel = serde_json::from_value(current)?;
        let id = state.require_id()?.to_string();

        let object = self
            .client
            .get_object(&id)
            .await
            .map_err(|e| ProviderError::api("Error during object reading", e))?;

        let attributes = self
            .client
            .get_object_attributes(&id)
            .await
            .map_err(|e| ProviderError::api("Error during object attributes reading", e))?;

        debug!(id = %id, remote_attributes = attributes.len(), "Reconciling object attributes");
        state.reconcile_attributes(&attributes);
        state.apply(&object);
        Ok(serde_json::to_value(state)?)
    }

    /// Resend the configured attribute set and refresh computed fields.
    #[instrument(skip(self, prior, planned), fields(workspace_id = %self.client.workspace_id()))]
    pub async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: ObjectResourceModel = serde_json::from_value(prior)?;
        let mut state: ObjectResourceModel = serde_json::from_value(planned)?;
        if state.require_id().is_err() {
            state.id = prior.id;
        }
        let id = state.require_id()?.to_string();

        info!(id = %id, "Updating object");
        let object = self
            .client
            .update_object(&id, &state.payload())
            .await
            .map_err(|e| ProviderError::api("Error during object update", e))?;

        state.apply(&object);
        Ok(serde_json::to_value(state)?)
    }

    /// Delete the object.
    #[instrument(skip(self, current), fields(workspace_id = %self.client.workspace_id()))]
    pub async fn delete(&self, current: Value) -> Result<(), ProviderError> {
        let state: ObjectResourceModel = serde_json::from_value(current)?;
        let id = state.require_id()?;

        self.client
            .delete_object(id)
            .await
            .map_err(|e| ProviderError::api("Error during object deletion", e))?;

        info!(id = %id, "Deleted object");
        Ok(())
    }
}
