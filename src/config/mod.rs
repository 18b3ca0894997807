use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::query::PageDefaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub query: QueryConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    /// Applied when a resource whitelist does not set its own depth
    pub max_include_depth: Option<usize>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for pagination links; empty keeps links relative
    pub base_url: String,
    pub port: u16,
    pub fixture_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub enable_audit_logging: bool,
}

impl QueryConfig {
    pub fn page_defaults(&self) -> PageDefaults {
        PageDefaults { default_limit: self.default_limit, max_limit: self.max_limit }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::preset(environment).with_env_overrides()
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup; unparseable values keep the preset
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Query overrides
        if let Some(v) = lookup("QUERY_DEFAULT_LIMIT") {
            self.query.default_limit = v.parse().unwrap_or(self.query.default_limit);
        }
        if let Some(v) = lookup("QUERY_MAX_LIMIT") {
            self.query.max_limit = v.parse().unwrap_or(self.query.max_limit);
        }
        if let Some(v) = lookup("QUERY_MAX_INCLUDE_DEPTH") {
            self.query.max_include_depth = v.parse().ok();
        }
        if let Some(v) = lookup("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        // API overrides
        if let Some(v) = lookup("API_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(port) = lookup("MONK_JSONAPI_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|v| v.parse().ok())
        {
            self.api.port = port;
        }
        if let Some(v) = lookup("MONK_FIXTURE_PATH") {
            self.api.fixture_path = Some(v).filter(|p| !p.is_empty());
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 1000,
                max_include_depth: None,
                debug_logging: true,
            },
            api: ApiConfig {
                base_url: String::new(),
                port: 3000,
                fixture_path: Some("fixtures/blog.yaml".to_string()),
            },
            security: SecurityConfig {
                enable_cors: true,
                enable_audit_logging: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 500,
                max_include_depth: Some(5),
                debug_logging: false,
            },
            api: ApiConfig {
                base_url: String::new(),
                port: 3000,
                fixture_path: None,
            },
            security: SecurityConfig {
                enable_cors: true,
                enable_audit_logging: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 100,
                max_include_depth: Some(3),
                debug_logging: false,
            },
            api: ApiConfig {
                base_url: String::new(),
                port: 3000,
                fixture_path: None,
            },
            security: SecurityConfig {
                enable_cors: false,
                enable_audit_logging: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
