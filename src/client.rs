//! HTTP client for the Jira Assets REST API.
//!
//! Every request carries basic-auth credentials and is scoped to the
//! configured workspace. Non-success responses become
//! [`ClientError::Status`] with the request URL, status, headers and body
//! attached.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ProviderConfig;
use crate::error::{ApiError, ClientError};
use crate::models::{Object, ObjectAttribute, ObjectPayload, ObjectSchema};

/// Base URL of the Atlassian cloud API gateway.
pub const DEFAULT_BASE_URL: &str = "https://api.atlassian.com";

/// A decoded response together with its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// Status code of the response.
    pub status: StatusCode,
    /// Decoded body.
    pub value: T,
}

struct RawResponse {
    url: String,
    status: StatusCode,
    body: String,
}

impl RawResponse {
    fn json<T: DeserializeOwned>(self) -> Result<Fetched<T>, ClientError> {
        let value = serde_json::from_str(&self.body).map_err(|source| ClientError::Decode {
            url: self.url,
            source,
        })?;
        Ok(Fetched {
            status: self.status,
            value,
        })
    }
}

/// Authenticated Assets API client bound to one workspace.
pub struct AssetsClient {
    http: Client,
    base_url: String,
    workspace_id: String,
    user: String,
    password: SecretString,
}

impl std::fmt::Debug for AssetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetsClient")
            .field("base_url", &self.base_url)
            .field("workspace_id", &self.workspace_id)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl AssetsClient {
    /// Build a client for the resolved configuration.
    pub fn new(config: ProviderConfig, base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            workspace_id: config.workspace_id,
            user: config.user,
            password: config.password,
        })
    }

    /// The workspace every request is scoped to.
    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/jsm/assets/workspace/{}/v1/{}",
            self.base_url, self.workspace_id, path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.user, Some(self.password.expose_secret()))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and return the raw body, failing on non-success status.
    async fn execute(&self, builder: RequestBuilder) -> Result<RawResponse, ClientError> {
        let request = builder.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!(%method, %url, "Sending Assets API request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<non-utf8>").to_string(),
                )
            })
            .collect();
        let body = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), "Received Assets API response");

        if !status.is_success() {
            return Err(ClientError::Status(Box::new(ApiError {
                method,
                url,
                status: status.as_u16(),
                headers,
                body,
            })));
        }

        Ok(RawResponse { url, status, body })
    }

    /// Create an object.
    #[instrument(skip(self, payload), fields(object_type_id = %payload.object_type_id))]
    pub async fn create_object(&self, payload: &ObjectPayload) -> Result<Object, ClientError> {
        let builder = self.request(Method::POST, "object/create").json(payload);
        Ok(self.execute(builder).await?.json()?.value)
    }

    /// Fetch an object by id.
    #[instrument(skip(self))]
    pub async fn get_object(&self, id: &str) -> Result<Object, ClientError> {
        let builder = self.request(Method::GET, &format!("object/{}", id));
        Ok(self.execute(builder).await?.json()?.value)
    }

    /// Fetch every attribute of an object.
    #[instrument(skip(self))]
    pub async fn get_object_attributes(&self, id: &str) -> Result<Vec<ObjectAttribute>, ClientError> {
        let builder = self.request(Method::GET, &format!("object/{}/attributes", id));
        Ok(self.execute(builder).await?.json()?.value)
    }

    /// Update an object. Attributes missing from the payload are left as they are.
    #[instrument(skip(self, payload))]
    pub async fn update_object(
        &self,
        id: &str,
        payload: &ObjectPayload,
    ) -> Result<Object, ClientError> {
        let builder = self
            .request(Method::PUT, &format!("object/{}", id))
            .json(payload);
        Ok(self.execute(builder).await?.json()?.value)
    }

    /// Delete an object.
    #[instrument(skip(self))]
    pub async fn delete_object(&self, id: &str) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("object/{}", id));
        self.execute(builder).await?;
        Ok(())
    }

    /// Fetch object schema metadata, keeping the response status.
    #[instrument(skip(self))]
    pub async fn get_object_schema(&self, id: &str) -> Result<Fetched<ObjectSchema>, ClientError> {
        let builder = self.request(Method::GET, &format!("objectschema/{}", id));
        self.execute(builder).await?.json()
    }
}
