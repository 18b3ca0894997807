// HTTP API error types rendered as JSON:API error documents
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

use crate::query::{QueryError, Violation};
use crate::resource::RegistryError;
use crate::serializer::{ErrorDocument, ErrorObject, ErrorSource, SerializeError, JSONAPI_MEDIA_TYPE};
use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    InvalidQuery(QueryError),
    Disallowed(Vec<Violation>),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidQuery(_) => 400,
            ApiError::Disallowed(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Error code for client handling; policy violations carry their own per item
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery(_) => "INVALID_FILTER_VALUE",
            ApiError::Disallowed(_) => "DISALLOWED_QUERY",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
            ApiError::InvalidQuery(err) => err.to_string(),
            ApiError::Disallowed(violations) => violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery(_) => "Invalid filter value",
            ApiError::Disallowed(_) => "Disallowed query parameter",
            ApiError::NotFound(_) => "Not found",
            ApiError::InternalServerError(_) => "Internal server error",
            ApiError::ServiceUnavailable(_) => "Service unavailable",
        }
    }

    /// One error object per violation, otherwise a single entry
    pub fn to_document(&self) -> ErrorDocument {
        let status = self.status_code().to_string();
        let errors = match self {
            ApiError::Disallowed(violations) => violations
                .iter()
                .map(|v| ErrorObject {
                    status: status.clone(),
                    code: v.code.as_str().to_string(),
                    title: v.code.title().to_string(),
                    detail: v.message.clone(),
                    source: Some(ErrorSource { parameter: v.parameter.clone() }),
                })
                .collect(),
            ApiError::InvalidQuery(err) => vec![ErrorObject {
                status,
                code: self.error_code().to_string(),
                title: self.title().to_string(),
                detail: err.to_string(),
                source: Some(ErrorSource { parameter: err.parameter() }),
            }],
            _ => vec![ErrorObject {
                status,
                code: self.error_code().to_string(),
                title: self.title().to_string(),
                detail: self.message(),
                source: None,
            }],
        };
        ErrorDocument::new(errors)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.to_document()).unwrap_or(Value::Null)
    }
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::InvalidQuery(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownType(resource_type) => {
                ApiError::not_found(format!("Resource type '{}' not found", resource_type))
            }
            StoreError::Unavailable(msg) => {
                tracing::error!("Record store unavailable: {}", msg);
                ApiError::service_unavailable("Record store temporarily unavailable")
            }
            StoreError::Query(msg) => {
                // Don't expose store internals to clients
                tracing::error!("Record store query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<SerializeError> for ApiError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::UnknownType(resource_type) => {
                ApiError::not_found(format!("Resource type '{}' not found", resource_type))
            }
            other => {
                tracing::error!("Serialization error: {}", other);
                ApiError::internal_server_error("Failed to format response")
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        tracing::error!("Resource registry error: {}", err);
        ApiError::internal_server_error("Resource registry is misconfigured")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)],
            Json(self.to_document()),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{apply_whitelist, QueryParser, WhitelistOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn invalid_between_points_at_parameter() {
        let err = ApiError::from(QueryError::InvalidBetween { field: "age".into() });
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json()["errors"][0],
            json!({
                "status": "400",
                "code": "INVALID_FILTER_VALUE",
                "title": "Invalid filter value",
                "detail": "Filter 'age' with 'between' requires exactly 2 comma-separated values",
                "source": { "parameter": "filter[age][between]" }
            })
        );
    }

    #[test]
    fn violations_become_one_error_each() {
        let parsed = QueryParser::default().parse_str("filter[password]=x&sort=secret").unwrap();
        let options = WhitelistOptions {
            allowed_filters: Some(vec!["status".into()]),
            allowed_sorts: Some(vec![]),
            ..Default::default()
        };
        let result = apply_whitelist(&parsed, &options);
        let body = ApiError::Disallowed(result.warnings).to_json();

        assert_eq!(body["jsonapi"], json!({ "version": "1.1" }));
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][0]["code"], json!("DISALLOWED_FILTER"));
        assert_eq!(body["errors"][0]["source"]["parameter"], json!("filter[password]"));
        assert_eq!(body["errors"][1]["detail"], json!("Sort field 'secret' is not allowed"));
    }

    #[test]
    fn store_internals_are_not_leaked() {
        let err = ApiError::from(StoreError::Query("syntax error near SELECT".into()));
        assert_eq!(err.status_code(), 500);
        assert!(!err.to_json().to_string().contains("SELECT"));
        assert!(err.to_json()["errors"][0].get("source").is_none());
    }

    #[test]
    fn response_uses_jsonapi_media_type() {
        let response = ApiError::not_found("Resource 'articles:9' not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSONAPI_MEDIA_TYPE);
    }
}
