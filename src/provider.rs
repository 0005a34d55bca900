//! The Jira Assets provider.
//!
//! [`JiraAssetsProvider`] resolves credentials in `configure`, builds one
//! [`AssetsClient`] and shares it with every resource and data source
//! handler for the rest of the session.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::client::{AssetsClient, DEFAULT_BASE_URL};
use crate::config::{self, EnvLookup, ProviderConfig, ProviderConfigInput};
use crate::error::ProviderError;
use crate::object_resource::{ObjectResource, OBJECT_RESOURCE};
use crate::object_schema_data_source::{ObjectSchemaDataSource, OBJECT_SCHEMA_DATA_SOURCE};
use crate::plan::PlanResult;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::{ImportedResource, ProviderMetadata, ProviderService};
use crate::validation;

/// Provider type name; resources and data sources are prefixed with it.
pub const TYPE_NAME: &str = "jiraassets";

/// Provider for Jira Assets objects and object schemas.
pub struct JiraAssetsProvider {
    version: String,
    base_url: String,
    env: EnvLookup,
    client: RwLock<Option<Arc<AssetsClient>>>,
}

impl JiraAssetsProvider {
    /// Create an unconfigured provider reporting `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            env: config::process_env(),
            client: RwLock::new(None),
        }
    }

    /// Send API requests to `base_url` instead of the Atlassian gateway.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve environment fallbacks from `vars` instead of the process
    /// environment.
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = config::map_env(vars);
        self
    }

    async fn client(&self) -> Result<Arc<AssetsClient>, ProviderError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or_else(|| ProviderError::Configuration("provider not configured".to_string()))
    }

    async fn object_resource(&self, resource_type: &str) -> Result<ObjectResource, ProviderError> {
        ensure_resource(resource_type)?;
        Ok(ObjectResource::new(self.client().await?))
    }
}

fn ensure_resource(resource_type: &str) -> Result<(), ProviderError> {
    if resource_type == OBJECT_RESOURCE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }
}

fn ensure_data_source(data_source_type: &str) -> Result<(), ProviderError> {
    if data_source_type == OBJECT_SCHEMA_DATA_SOURCE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

fn parse_config(config: Value) -> Result<ProviderConfigInput, ProviderError> {
    if config.is_null() {
        return Ok(ProviderConfigInput::default());
    }
    Ok(serde_json::from_value(config)?)
}

#[async_trait::async_trait]
impl ProviderService for JiraAssetsProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(config::schema())
            .with_resource(OBJECT_RESOURCE, ObjectResource::schema())
            .with_data_source(OBJECT_SCHEMA_DATA_SOURCE, ObjectSchemaDataSource::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: TYPE_NAME.to_string(),
            version: self.version.clone(),
            resources: vec![OBJECT_RESOURCE.to_string()],
            data_sources: vec![OBJECT_SCHEMA_DATA_SOURCE.to_string()],
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&config::schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let input = parse_config(config)?;

        let resolved = match ProviderConfig::resolve(input, self.env.as_ref()) {
            Ok(resolved) => resolved,
            Err(diagnostics) => {
                warn!(errors = diagnostics.len(), "Provider configuration incomplete");
                return Ok(diagnostics);
            },
        };

        let workspace_id = resolved.workspace_id.clone();
        let user = resolved.user.clone();
        let client = match AssetsClient::new(resolved, self.base_url.as_str()) {
            Ok(client) => client,
            Err(err) => {
                return Ok(vec![Diagnostic::error("Unable to create Assets client")
                    .with_detail(format!(
                        "An unexpected error occurred when creating the Assets API client: {}",
                        err
                    ))]);
            },
        };

        *self.client.write().await = Some(Arc::new(client));
        info!(%workspace_id, %user, "Configured Assets client");
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        if self.client.write().await.take().is_some() {
            info!("Released Assets client");
        }
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        ensure_resource(resource_type)?;
        Ok(ObjectResource::validate(&config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        ensure_resource(resource_type)?;
        ObjectResource::plan(prior_state.as_ref(), &proposed_state)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.object_resource(resource_type)
            .await?
            .create(planned_state)
            .await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.object_resource(resource_type)
            .await?
            .read(current_state)
            .await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.object_resource(resource_type)
            .await?
            .update(prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.object_resource(resource_type)
            .await?
            .delete(current_state)
            .await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        ensure_resource(resource_type)?;
        Ok(vec![ObjectResource::import(id)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        ensure_data_source(data_source_type)?;
        Ok(ObjectSchemaDataSource::validate(&config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        ensure_data_source(data_source_type)?;
        ObjectSchemaDataSource::new(self.client().await?)
            .read(config)
            .await
    }
}
