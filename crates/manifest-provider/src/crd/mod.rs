//! Manifest data sources for individual custom resources, grouped by API group.

pub mod common;
pub mod infrastructure;
