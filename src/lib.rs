pub mod cli;
pub mod config;
pub mod error;
pub mod fixture;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod resource;
pub mod serializer;
pub mod store;

pub use error::ApiError;
pub use handlers::{router, AppState, ServeOptions};
