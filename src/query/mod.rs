pub mod types;
pub mod error;
pub mod coerce;
pub mod validate;
pub mod params;
pub mod filter_where;
pub mod filter_order;
pub mod page;
pub mod include;
pub mod parser;
pub mod translate;
pub mod whitelist;

pub use types::*;
pub use error::QueryError;
pub use coerce::coerce;
pub use validate::{is_valid_field, is_valid_operator};
pub use params::QueryParams;
pub use parser::QueryParser;
pub use translate::translate;
pub use whitelist::{apply_whitelist, is_field_allowed, OnDisallowed, ValidationResult, Violation, ViolationCode, WhitelistOptions};
