//! CLI command implementations

pub mod experiment;
pub mod inspect;
pub mod render;
pub mod validate;

mod reporting;
