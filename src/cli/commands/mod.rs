//! CLI command implementations.

pub mod analyze;
pub mod rules;
pub mod validate;
