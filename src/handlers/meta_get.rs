// GET /meta/:resource_type - metadata, query whitelist and validation rules
use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::serializer::JsonApiObject;

pub async fn meta_get(State(state): State<AppState>, Path(resource_type): Path<String>) -> ApiResult<Value> {
    let metadata = state
        .registry
        .get(&resource_type)
        .ok_or_else(|| ApiError::not_found(format!("Resource type '{}' not found", resource_type)))?;

    Ok(ApiResponse::success(json!({
        "jsonapi": JsonApiObject::default(),
        "meta": {
            "resource": metadata,
            "whitelist": state.whitelist_for(&resource_type),
            "rules": state.registry.rules_for(&resource_type),
        }
    })))
}
