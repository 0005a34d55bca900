//! The `jiraassets_object_schema` data source.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::AssetsClient;
use crate::error::ProviderError;
use crate::models::ObjectSchema;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation;

/// Type name of the data source.
pub const OBJECT_SCHEMA_DATA_SOURCE: &str = "jiraassets_object_schema";

/// State of a `jiraassets_object_schema` data source. Fields mirror the schema.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSchemaModel {
    pub workspace_id: String,
    pub global_id: String,
    pub id: String,
    pub name: String,
    pub object_schema_key: String,
    pub status: String,
    pub description: String,
    pub created: String,
    pub updated: String,
    pub object_count: i64,
    pub object_type_count: i64,
    pub can_manage: bool,
    pub id_as_int: i64,
}

impl From<ObjectSchema> for ObjectSchemaModel {
    fn from(schema: ObjectSchema) -> Self {
        Self {
            workspace_id: schema.workspace_id,
            global_id: schema.global_id,
            id: schema.id,
            name: schema.name,
            object_schema_key: schema.object_schema_key,
            status: schema.status,
            description: schema.description.unwrap_or_default(),
            created: schema.created,
            updated: schema.updated,
            object_count: schema.object_count,
            object_type_count: schema.object_type_count,
            can_manage: schema.can_manage,
            id_as_int: schema.id_as_int,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObjectSchemaConfig {
    id: String,
}

impl ObjectSchemaConfig {
    fn parse(config: Value) -> Result<Self, ProviderError> {
        let config: Self = serde_json::from_value(config)?;
        if config.id.parse::<u64>().is_err() {
            return Err(ProviderError::Validation(format!(
                "object schema id must be numeric, got '{}'",
                config.id
            )));
        }
        Ok(config)
    }
}

/// Handler for `jiraassets_object_schema`, bound to a configured client.
pub struct ObjectSchemaDataSource {
    client: Arc<AssetsClient>,
}

impl ObjectSchemaDataSource {
    /// Bind the data source to the provider's shared client.
    pub fn new(client: Arc<AssetsClient>) -> Self {
        Self { client }
    }

    /// Schema of the data source.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Metadata of a Jira Assets object schema.")
            .with_attribute("id", Attribute::required_string())
            .with_attribute("workspace_id", Attribute::computed_string())
            .with_attribute("global_id", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("object_schema_key", Attribute::computed_string())
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("description", Attribute::computed_string())
            .with_attribute("created", Attribute::computed_string())
            .with_attribute("updated", Attribute::computed_string())
            .with_attribute("object_count", Attribute::computed_int64())
            .with_attribute("object_type_count", Attribute::computed_int64())
            .with_attribute("can_manage", Attribute::computed_bool())
            .with_attribute("id_as_int", Attribute::computed_int64())
    }

    /// Validate data source configuration, including the numeric id.
    pub fn validate(config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&Self::schema(), config);
        if diagnostics.is_empty() {
            if let Err(err) = ObjectSchemaConfig::parse(config.clone()) {
                diagnostics.push(err.to_diagnostic().with_attribute("id"));
            }
        }
        diagnostics
    }

    /// Fetch the object schema. Only a 200 response is accepted.
    #[instrument(skip(self, config), fields(workspace_id = %self.client.workspace_id()))]
    pub async fn read(&self, config: Value) -> Result<Value, ProviderError> {
        let config = ObjectSchemaConfig::parse(config)?;
        debug!(id = %config.id, "Reading object schema data source");

        let fetched = self
            .client
            .get_object_schema(&config.id)
            .await
            .map_err(|e| ProviderError::api("Unable to read Assets object schema", e))?;

        if fetched.status != StatusCode::OK {
            return Err(ProviderError::UnexpectedStatus {
                status: fetched.status.as_u16(),
                reason: fetched
                    .status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        Ok(serde_json::to_value(ObjectSchemaModel::from(fetched.value))?)
    }
}
