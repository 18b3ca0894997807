use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;
use crate::serializer::JSONAPI_MEDIA_TYPE;

/// Wraps a serializable body as an `application/vnd.api+json` response
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub body: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(body: T) -> Self {
        Self { body, status_code: None }
    }

    pub fn with_status(body: T, status_code: StatusCode) -> Self {
        Self { body, status_code: Some(status_code) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let body = match serde_json::to_vec(&self.body) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to serialize response document: {}", e);
                return ApiError::internal_server_error("Failed to serialize response document").into_response();
            }
        };

        (status, [(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)], body).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
