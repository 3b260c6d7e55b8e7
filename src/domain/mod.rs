pub mod errors;
pub mod models;
pub mod services;

pub use errors::{ReviewError, ReviewResult, ValidationError};
