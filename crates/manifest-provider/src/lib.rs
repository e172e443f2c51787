//! Read-only data sources rendering Kubernetes custom resources as YAML manifests.
//!
//! Each data source validates a structured configuration against its [`schema::Schema`], then
//! emits the corresponding manifest with a fixed `apiVersion` and `kind`. Hosts look data sources
//! up by type name through the [`provider::Provider`] registry.
pub mod crd;
pub mod diagnostics;
pub mod kvp;
pub mod logging;
pub mod manifest;
pub mod provider;
pub mod schema;
pub mod validation;

pub use provider::{DataSource, Provider, ReadResponse};
