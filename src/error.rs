//! Error types for the Jira Assets provider.

use thiserror::Error;
use tracing::error;

use crate::schema::Diagnostic;

/// A non-success response from the Assets API, with everything needed to
/// debug it after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {url} returned HTTP {status}: {body}")]
pub struct ApiError {
    /// HTTP method of the failed request.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Response status code.
    pub status: u16,
    /// Response headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: String,
}

/// Errors raised by [`AssetsClient`](crate::client::AssetsClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be built or sent, or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error(transparent)]
    Status(Box<ApiError>),

    /// The API answered successfully but the body did not match the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Request URL whose response failed to decode.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status code of the failed response, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(api) => Some(api.status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }

    /// Emit a structured error event describing this failure.
    pub fn log(&self, operation: &str) {
        match self {
            Self::Status(api) => error!(
                operation,
                method = %api.method,
                url = %api.url,
                status_code = api.status,
                headers = ?api.headers,
                body = %api.body,
                "Assets API request failed"
            ),
            Self::Transport(err) => error!(
                operation,
                url = err.url().map(|u| u.as_str()).unwrap_or_default(),
                error = %err,
                "Assets API request could not be completed"
            ),
            Self::Decode { url, source } => error!(
                operation,
                url = %url,
                error = %source,
                "Assets API response could not be decoded"
            ),
        }
    }
}

/// Errors that can occur while serving provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Input did not match the schema or its constraints.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is missing configuration or was never configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// State or configuration JSON could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A call to the Assets API failed.
    #[error("{operation}: {source}")]
    Api {
        /// Short summary of the operation that failed.
        operation: String,
        /// The underlying client failure.
        #[source]
        source: ClientError,
    },

    /// The Assets API answered with a status code other than the one required.
    #[error("Unexpected HTTP status code from Assets API: {status} {reason}")]
    UnexpectedStatus {
        /// Status code received.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },
}

impl ProviderError {
    /// Wrap a client failure, logging the request context first.
    pub fn api(operation: impl Into<String>, source: ClientError) -> Self {
        let operation = operation.into();
        source.log(&operation);
        Self::Api { operation, source }
    }

    /// Convert this error into a host diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Api { operation, source } => {
                Diagnostic::error(operation.clone()).with_detail(source.to_string())
            },
            Self::UnexpectedStatus { status, reason } => {
                Diagnostic::error("Unexpected HTTP status code from Assets API")
                    .with_detail(format!("{} {}", status, reason))
            },
            other => Diagnostic::error(other.to_string()),
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err {
            ProviderError::UnknownResource(_) => tonic::Status::not_found(message),
            ProviderError::Validation(_) | ProviderError::Serialization(_) => {
                tonic::Status::invalid_argument(message)
            },
            ProviderError::Configuration(_) => tonic::Status::failed_precondition(message),
            ProviderError::UnexpectedStatus { .. } => tonic::Status::unknown(message),
            ProviderError::Api { source, .. } => match source.status() {
                None if matches!(source, ClientError::Transport(_)) => {
                    tonic::Status::unavailable(message)
                },
                Some(404) => tonic::Status::not_found(message),
                Some(401) | Some(403) => tonic::Status::permission_denied(message),
                Some(409) => tonic::Status::already_exists(message),
                Some(429) => tonic::Status::resource_exhausted(message),
                Some(400) => tonic::Status::invalid_argument(message),
                Some(s) if s >= 500 => tonic::Status::unavailable(message),
                _ => tonic::Status::internal(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    fn api_error(status: u16) -> ClientError {
        ClientError::Status(Box::new(ApiError {
            method: "GET".to_string(),
            url: "https://api.atlassian.com/jsm/assets/workspace/ws/v1/object/7".to_string(),
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: r#"{"errorMessages":["nope"]}"#.to_string(),
        }))
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Configuration("provider not configured".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: provider not configured"
        );

        let err = ProviderError::UnknownResource("jiraassets_widget".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: jiraassets_widget");

        let err = ProviderError::UnexpectedStatus {
            status: 201,
            reason: "Created".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Unexpected HTTP status code from Assets API: 201 Created"
        );
    }

    #[test]
    fn test_api_error_display_includes_request_context() {
        let err = ProviderError::Api {
            operation: "Error during object reading".to_string(),
            source: api_error(404),
        };
        let display = err.to_string();
        assert!(display.starts_with("Error during object reading: GET https://"));
        assert!(display.contains("returned HTTP 404"));
        assert!(display.contains("errorMessages"));
    }

    #[test]
    fn test_api_diagnostic_uses_operation_as_summary() {
        let err = ProviderError::Api {
            operation: "Error during object creation".to_string(),
            source: api_error(400),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Error during object creation");
        assert!(diag.detail.unwrap().contains("HTTP 400"));
    }

    #[test]
    fn test_unexpected_status_diagnostic() {
        let err = ProviderError::UnexpectedStatus {
            status: 201,
            reason: "Created".to_string(),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.summary, "Unexpected HTTP status code from Assets API");
        assert_eq!(diag.detail, Some("201 Created".to_string()));
    }

    #[test]
    fn test_client_error_status() {
        assert_eq!(api_error(503).status(), Some(503));

        let decode = ClientError::Decode {
            url: "http://localhost/x".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(decode.status(), None);
    }

    #[test]
    fn test_error_to_status() {
        let cases = [
            (404, tonic::Code::NotFound),
            (401, tonic::Code::PermissionDenied),
            (403, tonic::Code::PermissionDenied),
            (409, tonic::Code::AlreadyExists),
            (429, tonic::Code::ResourceExhausted),
            (400, tonic::Code::InvalidArgument),
            (502, tonic::Code::Unavailable),
            (418, tonic::Code::Internal),
        ];
        for (http, code) in cases {
            let status: tonic::Status = ProviderError::Api {
                operation: "op".to_string(),
                source: api_error(http),
            }
            .into();
            assert_eq!(status.code(), code, "HTTP {}", http);
        }

        let status: tonic::Status = ProviderError::Configuration("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status: tonic::Status = ProviderError::Validation("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = ProviderError::UnknownResource("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }
}
