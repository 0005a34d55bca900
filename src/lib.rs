//! Jira Assets Provider
//!
//! Manages Jira Assets (formerly Insight) objects and reads object schema
//! metadata through the Assets REST API, for an infrastructure-as-code host.
//!
//! # Overview
//!
//! The host owns the plugin protocol and drives the provider through the
//! [`ProviderService`] trait. The crate provides:
//!
//! - **[`JiraAssetsProvider`]**: the provider, with configuration resolved from
//!   explicit values or `JIRAASSETS_*` environment variables
//! - **`jiraassets_object`**: a resource with create, read, update, delete,
//!   plan and import support
//! - **`jiraassets_object_schema`**: a data source reading object schema
//!   metadata by numeric id
//! - **Schema types** and schema-driven **validation** and **planning**
//! - **[`testing::ProviderTester`]**: drives the provider without a host
//!
//! # Quick Start
//!
//! ```no_run
//! use jiraassets_provider::{JiraAssetsProvider, ProviderService};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), jiraassets_provider::ProviderError> {
//! jiraassets_provider::try_init_logging();
//!
//! let provider = JiraAssetsProvider::new(env!("CARGO_PKG_VERSION"));
//! let diagnostics = provider
//!     .configure(json!({
//!         "workspace_id": "a1b2c3",
//!         "user": "admin@example.com",
//!         "password": "api-token"
//!     }))
//!     .await?;
//! assert!(diagnostics.is_empty());
//!
//! let schema = provider
//!     .read_data_source("jiraassets_object_schema", json!({"id": "1"}))
//!     .await?;
//! println!("{}", schema["name"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Provider Protocol
//!
//! - **Metadata / Schema**: type name `jiraassets`, resource and data source names
//! - **ValidateProviderConfig / Configure**: credential checks and client setup
//! - **ValidateResourceConfig / Plan**: schema checks and change calculation
//! - **Create/Read/Update/Delete**: object lifecycle against the Assets API
//! - **ImportResource**: import an object by id
//! - **ValidateDataSourceConfig / ReadDataSource**: object schema lookup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
#[allow(missing_docs)]
pub mod models;
pub mod object_resource;
pub mod object_schema_data_source;
pub mod plan;
pub mod provider;
pub mod schema;
pub mod service;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use client::AssetsClient;
pub use error::{ApiError, ClientError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{JiraAssetsProvider, TYPE_NAME};
pub use schema::ProviderSchema;
pub use plan::{AttributeChange, PlanResult};
pub use service::{ImportedResource, ProviderMetadata, ProviderService};
pub use validation::validate;

pub use async_trait::async_trait;
pub use serde_json;
