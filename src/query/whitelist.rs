use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::ParsedQuery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnDisallowed {
    /// Drop the item, record a warning, keep serving the request
    #[default]
    Ignore,
    /// Drop the item and reject the request
    Error,
}

/// Per-resource allow-lists. `None` allows everything for that dimension,
/// an empty list allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_filters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_sorts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_includes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_include_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_fields: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub on_disallowed: OnDisallowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    DisallowedFilter,
    DisallowedSort,
    DisallowedInclude,
    IncludeDepthExceeded,
    DisallowedField,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::DisallowedFilter => "DISALLOWED_FILTER",
            ViolationCode::DisallowedSort => "DISALLOWED_SORT",
            ViolationCode::DisallowedInclude => "DISALLOWED_INCLUDE",
            ViolationCode::IncludeDepthExceeded => "INCLUDE_DEPTH_EXCEEDED",
            ViolationCode::DisallowedField => "DISALLOWED_FIELD",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViolationCode::DisallowedFilter => "Disallowed filter",
            ViolationCode::DisallowedSort => "Disallowed sort",
            ViolationCode::DisallowedInclude => "Disallowed include",
            ViolationCode::IncludeDepthExceeded => "Include depth exceeded",
            ViolationCode::DisallowedField => "Disallowed field",
        }
    }
}

/// One rejected query item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
    /// Offending query parameter, e.g. `filter[password]` or `fields[people]`
    pub parameter: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub parsed: ParsedQuery,
    pub warnings: Vec<Violation>,
    pub errors: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_rejected(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Exact match, or a strict dot-prefix ancestor of `field` is allowed.
/// Ancestors are tried from the longest prefix outward.
pub fn is_field_allowed(field: &str, allowed: &[String]) -> bool {
    if allowed.iter().any(|a| a == field) {
        return true;
    }
    field
        .rmatch_indices('.')
        .map(|(idx, _)| &field[..idx])
        .any(|ancestor| allowed.iter().any(|a| a == ancestor))
}

pub fn include_depth(path: &str) -> usize {
    path.split('.').count()
}

/// Filters a parsed query through the allow-lists. Every dimension is
/// checked before returning so callers see all violations at once.
pub fn apply_whitelist(parsed: &ParsedQuery, options: &WhitelistOptions) -> ValidationResult {
    let mut violations = Vec::new();
    let mut result = parsed.clone();

    if let Some(allowed) = &options.allowed_filters {
        result.filter.retain(|condition| {
            let ok = is_field_allowed(&condition.field, allowed);
            if !ok {
                violations.push(Violation {
                    code: ViolationCode::DisallowedFilter,
                    message: format!("Filter field '{}' is not allowed", condition.field),
                    parameter: format!("filter[{}]", condition.field),
                });
            }
            ok
        });
    }

    if let Some(allowed) = &options.allowed_sorts {
        result.sort.retain(|sort| {
            let ok = allowed.iter().any(|a| a == &sort.field);
            if !ok {
                violations.push(Violation {
                    code: ViolationCode::DisallowedSort,
                    message: format!("Sort field '{}' is not allowed", sort.field),
                    parameter: "sort".to_string(),
                });
            }
            ok
        });
    }

    if options.allowed_includes.is_some() || options.max_include_depth.is_some() {
        result.include.retain(|path| {
            if let Some(max) = options.max_include_depth {
                if include_depth(path) > max {
                    violations.push(Violation {
                        code: ViolationCode::IncludeDepthExceeded,
                        message: format!("Include '{}' exceeds max depth of {}", path, max),
                        parameter: "include".to_string(),
                    });
                    return false;
                }
            }
            if let Some(allowed) = &options.allowed_includes {
                if !is_field_allowed(path, allowed) {
                    violations.push(Violation {
                        code: ViolationCode::DisallowedInclude,
                        message: format!("Include '{}' is not allowed", path),
                        parameter: "include".to_string(),
                    });
                    return false;
                }
            }
            true
        });
    }

    if let Some(allowed_fields) = &options.allowed_fields {
        let mut fields = BTreeMap::new();
        for (resource_type, requested) in &result.fields {
            let Some(allowed) = allowed_fields.get(resource_type) else {
                fields.insert(resource_type.clone(), requested.clone());
                continue;
            };
            let mut kept = Vec::new();
            for field in requested {
                if allowed.contains(field) {
                    kept.push(field.clone());
                } else {
                    violations.push(Violation {
                        code: ViolationCode::DisallowedField,
                        message: format!("Field '{}' for type '{}' is not allowed", field, resource_type),
                        parameter: format!("fields[{}]", resource_type),
                    });
                }
            }
            fields.insert(resource_type.clone(), kept);
        }
        result.fields = fields;
    }

    let (warnings, errors) = match options.on_disallowed {
        OnDisallowed::Ignore => (violations, Vec::new()),
        OnDisallowed::Error => (Vec::new(), violations),
    };

    ValidationResult { parsed: result, warnings, errors }
}
