// HTTP surface: collection/record reads, resource description, health
use std::collections::HashMap;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::fixture::Fixture;
use crate::query::{PageDefaults, WhitelistOptions};
use crate::resource::ResourceRegistry;
use crate::store::RecordStore;

pub mod context;
pub mod health;
pub mod meta_get;
pub mod record_get;
pub mod resource_get;

pub use context::RequestContext;
pub use health::health;
pub use meta_get::meta_get;
pub use record_get::record_get;
pub use resource_get::resource_get;

/// Request-independent knobs, usually taken from `AppConfig`
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub page_defaults: PageDefaults,
    /// Fallback include depth for types whose whitelist sets none
    pub max_include_depth: Option<usize>,
    /// Prefix for pagination links
    pub base_url: String,
    pub audit_logging: bool,
    pub enable_cors: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            page_defaults: PageDefaults::default(),
            max_include_depth: None,
            base_url: String::new(),
            audit_logging: false,
            enable_cors: false,
        }
    }
}

impl ServeOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_defaults: config.query.page_defaults(),
            max_include_depth: config.query.max_include_depth,
            base_url: config.api.base_url.clone(),
            audit_logging: config.security.enable_audit_logging,
            enable_cors: config.security.enable_cors,
        }
    }
}

/// Shared read-only state; nothing request-scoped lives here
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ResourceRegistry>,
    pub store: Arc<dyn RecordStore>,
    pub whitelists: Arc<HashMap<String, WhitelistOptions>>,
    pub options: Arc<ServeOptions>,
}

impl AppState {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        store: Arc<dyn RecordStore>,
        whitelists: HashMap<String, WhitelistOptions>,
        options: ServeOptions,
    ) -> Self {
        Self { registry, store, whitelists: Arc::new(whitelists), options: Arc::new(options) }
    }

    pub fn from_fixture(fixture: Fixture, options: ServeOptions) -> Self {
        Self::new(fixture.registry, Arc::new(fixture.store), fixture.whitelists, options)
    }

    /// The type's whitelist with the configured include depth filled in
    pub fn whitelist_for(&self, resource_type: &str) -> WhitelistOptions {
        let mut options = self.whitelists.get(resource_type).cloned().unwrap_or_default();
        if options.max_include_depth.is_none() {
            options.max_include_depth = self.options.max_include_depth;
        }
        options
    }
}

pub fn router(state: AppState) -> Router {
    let enable_cors = state.options.enable_cors;

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/:resource_type", get(resource_get))
        .route("/api/:resource_type/:id", get(record_get))
        .route("/meta/:resource_type", get(meta_get))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
