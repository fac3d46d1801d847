//! CLI command implementations

pub mod completions;
pub mod config;
pub mod encode;
pub mod negotiate;
