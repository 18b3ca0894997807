use thiserror::Error;

/// Malformed operands from an otherwise well-formed request. Unknown fields
/// and operators never get here; they are dropped during parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Filter '{field}' with 'between' requires exactly 2 comma-separated values")]
    InvalidBetween { field: String },

    #[error("Filter '{field}' with 'null' requires 'true' or 'false'")]
    InvalidNull { field: String },
}

impl QueryError {
    /// Query parameter the error points at, e.g. `filter[age][between]`
    pub fn parameter(&self) -> String {
        match self {
            QueryError::InvalidBetween { field } => format!("filter[{}][between]", field),
            QueryError::InvalidNull { field } => format!("filter[{}][null]", field),
        }
    }
}
