// GET /api/:resource_type - filtered, sorted, paginated collection
use axum::extract::{Path, RawQuery, State};

use super::{AppState, RequestContext};
use crate::middleware::{ApiResponse, ApiResult};
use crate::serializer::{Document, ResourceSerializer};

pub async fn resource_get(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Document> {
    let ctx = RequestContext::build(&state, &resource_type, query.as_deref())?;

    let (records, total) = state.store.find_many(&resource_type, &ctx.find_args()).await?;
    tracing::debug!(resource_type = %resource_type, total, returned = records.len(), "collection loaded");

    let page = ctx.page_context(&state.options.base_url, total);
    let document = ResourceSerializer::new(&state.registry).serialize_many(
        &records,
        &resource_type,
        &ctx.serialize_options(Some(page)),
    )?;

    Ok(ApiResponse::success(document))
}
