use once_cell::sync::Lazy;
use regex::Regex;

use super::types::OperatorKind;

pub const MAX_FIELD_LENGTH: usize = 100;

static FIELD_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("field path pattern")
});

/// Dotted attribute/relationship path such as `author.profile.name`
pub fn is_valid_field(name: &str) -> bool {
    name.len() <= MAX_FIELD_LENGTH && FIELD_PATH.is_match(name)
}

pub fn is_valid_operator(op: &str) -> bool {
    OperatorKind::from_token(op).is_some()
}
