use axum::extract::State;
use serde_json::{json, Value};

use super::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::serializer::JsonApiObject;

pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "jsonapi": JsonApiObject::default(),
        "meta": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "version": env!("CARGO_PKG_VERSION"),
            "types": state.registry.types(),
        }
    })))
}
