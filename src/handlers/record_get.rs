// GET /api/:resource_type/:id - single record with includes
use axum::extract::{Path, RawQuery, State};

use super::{AppState, RequestContext};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::serializer::{Document, ResourceSerializer};

pub async fn record_get(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> ApiResult<Document> {
    let ctx = RequestContext::build(&state, &resource_type, query.as_deref())?;

    let record = state
        .store
        .find_one(&resource_type, &id, &ctx.parsed.include)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Resource '{}' with id '{}' not found", resource_type, id)))?;

    let document = ResourceSerializer::new(&state.registry).serialize_one(
        Some(&record),
        &resource_type,
        &ctx.serialize_options(None),
    )?;

    Ok(ApiResponse::success(document))
}
