//! Provider configuration: explicit values with environment fallback.
//!
//! Each setting resolves as explicit configuration value (when not null),
//! then the matching environment variable, then absent. Every missing
//! setting produces its own diagnostic so the operator sees all of them at
//! once.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;

use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable consulted when `workspace_id` is not configured.
pub const ENV_WORKSPACE_ID: &str = "JIRAASSETS_WORKSPACE_ID";
/// Environment variable consulted when `user` is not configured.
pub const ENV_USER: &str = "JIRAASSETS_USER";
/// Environment variable consulted when `password` is not configured.
pub const ENV_PASSWORD: &str = "JIRAASSETS_PASSWORD";

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|name: &str| std::env::var(name).ok())
}

/// Environment lookup backed by a fixed map.
pub fn map_env(vars: HashMap<String, String>) -> EnvLookup {
    Arc::new(move |name: &str| vars.get(name).cloned())
}

/// The provider configuration block as sent by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfigInput {
    /// Workspace id of the Assets instance.
    pub workspace_id: Option<String>,
    /// Admin or service account user.
    pub user: Option<String>,
    /// API token for the account.
    pub password: Option<String>,
}

/// Fully resolved provider settings.
///
/// `Debug` output redacts the password.
#[derive(Debug)]
pub struct ProviderConfig {
    /// Workspace id used to scope every API call.
    pub workspace_id: String,
    /// User for basic authentication.
    pub user: String,
    /// API token for basic authentication.
    pub password: SecretString,
}

struct Setting {
    attribute: &'static str,
    env: &'static str,
    label: &'static str,
}

const WORKSPACE_ID: Setting = Setting {
    attribute: "workspace_id",
    env: ENV_WORKSPACE_ID,
    label: "Workspace Id",
};
const USER: Setting = Setting {
    attribute: "user",
    env: ENV_USER,
    label: "User",
};
const PASSWORD: Setting = Setting {
    attribute: "password",
    env: ENV_PASSWORD,
    label: "Password",
};

impl Setting {
    fn resolve(
        &self,
        explicit: Option<String>,
        env: &(dyn Fn(&str) -> Option<String> + Send + Sync),
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let value = explicit.or_else(|| env(self.env)).unwrap_or_default();
        if value.is_empty() {
            diagnostics.push(
                Diagnostic::error(format!("Missing Assets API {}", self.label))
                    .with_detail(format!(
                        "The provider cannot create the Assets API client as there is a missing or \
                         empty value for the Assets API {}. Set the {} value in the configuration \
                         or use the {} environment variable. If either is already set, ensure the \
                         value is not empty.",
                        self.label.to_lowercase(),
                        self.attribute,
                        self.env
                    ))
                    .with_attribute(self.attribute),
            );
        }
        value
    }
}

impl ProviderConfig {
    /// Resolve settings from explicit input and the environment.
    ///
    /// Returns one error diagnostic per missing setting.
    pub fn resolve(
        input: ProviderConfigInput,
        env: &(dyn Fn(&str) -> Option<String> + Send + Sync),
    ) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        let workspace_id = WORKSPACE_ID.resolve(input.workspace_id, env, &mut diagnostics);
        let user = USER.resolve(input.user, env, &mut diagnostics);
        let password = PASSWORD.resolve(input.password, env, &mut diagnostics);

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        Ok(Self {
            workspace_id,
            user,
            password: SecretString::from(password),
        })
    }
}

/// Schema of the provider configuration block.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A provider for Jira Assets.")
        .with_attribute(
            "workspace_id",
            Attribute::optional_string().with_description("Workspace Id of the Assets instance."),
        )
        .with_attribute(
            "user",
            Attribute::optional_string().with_description(
                "Username of an admin or service account with access to the Jira API.",
            ),
        )
        .with_attribute(
            "password",
            Attribute::optional_string()
                .sensitive()
                .with_description("Personal access token for the admin or service account."),
        )
}
