use serde_json::{json, Map};

use super::AppState;
use crate::error::ApiError;
use crate::query::{apply_whitelist, ParsedQuery, QueryParams, QueryParser, Violation};
use crate::serializer::{PageContext, SerializeOptions};
use crate::store::FindArgs;

/// Everything derived from one request's query string. Built by value in
/// each handler and dropped with the response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub resource_type: String,
    pub params: QueryParams,
    /// Parse after whitelist filtering
    pub parsed: ParsedQuery,
    pub warnings: Vec<Violation>,
}

impl RequestContext {
    /// Parse, then filter through the type's whitelist. Violations in
    /// `error` mode reject the request before the store is touched.
    pub fn build(state: &AppState, resource_type: &str, raw_query: Option<&str>) -> Result<Self, ApiError> {
        if !state.registry.contains(resource_type) {
            return Err(ApiError::not_found(format!("Resource type '{}' not found", resource_type)));
        }

        let params = QueryParams::parse(raw_query.unwrap_or_default());
        let parsed = QueryParser::new(state.options.page_defaults).parse(&params)?;

        let whitelist = state.whitelist_for(resource_type);
        let result = apply_whitelist(&parsed, &whitelist);

        if state.options.audit_logging {
            for violation in result.warnings.iter().chain(&result.errors) {
                tracing::warn!(
                    resource_type,
                    code = violation.code.as_str(),
                    parameter = %violation.parameter,
                    "{}",
                    violation.message
                );
            }
        }

        if result.is_rejected() {
            return Err(ApiError::Disallowed(result.errors));
        }

        Ok(Self {
            resource_type: resource_type.to_string(),
            params,
            parsed: result.parsed,
            warnings: result.warnings,
        })
    }

    pub fn find_args(&self) -> FindArgs {
        FindArgs::from_query(&self.parsed)
    }

    pub fn page_context(&self, base_url: &str, total: u64) -> PageContext {
        PageContext {
            offset: self.parsed.page.offset,
            limit: self.parsed.page.limit,
            total,
            base_url: format!("{}/api/{}", base_url, self.resource_type),
            params: self.params.pairs().to_vec(),
        }
    }

    pub fn serialize_options(&self, page: Option<PageContext>) -> SerializeOptions {
        let mut meta = Map::new();
        if !self.warnings.is_empty() {
            let messages: Vec<String> = self.warnings.iter().map(ToString::to_string).collect();
            meta.insert("warnings".to_string(), json!(messages));
        }
        SerializeOptions {
            fields: self.parsed.fields.clone(),
            include: self.parsed.include.clone(),
            page,
            meta,
        }
    }
}
