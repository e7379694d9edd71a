//! CLI command implementations.

pub mod sample;
pub mod schema;
pub mod wrangle;
