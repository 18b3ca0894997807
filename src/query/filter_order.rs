use super::types::{SortDirection, SortField};
use super::validate::is_valid_field;

/// Parses the comma-separated `sort` parameter
pub struct FilterOrder;

impl FilterOrder {
    pub fn parse(sort: &str) -> Vec<SortField> {
        let mut out = Vec::new();
        let mut dropped = 0usize;

        for part in sort.split(',') {
            let token = part.trim();
            if token.is_empty() {
                continue;
            }
            let (field, order) = match token.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (token, SortDirection::Asc),
            };
            if !is_valid_field(field) {
                dropped += 1;
                continue;
            }
            out.push(SortField { field: field.to_string(), order });
        }

        if dropped > 0 {
            tracing::debug!(dropped, "ignored unrecognized sort tokens");
        }
        out
    }
}
