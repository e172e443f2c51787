//! The registry of data sources exposed to the host.
use std::{collections::BTreeMap, marker::PhantomData};

use serde::Serialize;
use serde_json::Value;
use snafu::{OptionExt, Snafu};

use crate::{
    crd::infrastructure::KubevirtClusterTemplateV1Alpha1,
    manifest::{self, ManifestDataSource},
    schema::Schema,
};

#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("unknown data source {type_name:?}, expected one of: {}", known.join(", ")))]
pub struct UnknownDataSourceError {
    pub type_name: String,
    pub known: Vec<&'static str>,
}

/// The computed attributes returned by a successful read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReadResponse {
    pub id: String,
    pub yaml: String,
}

/// A read-only data source as seen by the host.
///
/// This is the object-safe counterpart of [`ManifestDataSource`], which every manifest data source
/// is adapted to via [`ManifestBinding`].
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Validates `config` and renders the manifest.
    fn read(&self, config: &Value) -> Result<ReadResponse, manifest::Error>;
}

/// Adapts a [`ManifestDataSource`] into a [`DataSource`].
pub struct ManifestBinding<D>(PhantomData<fn() -> D>);

impl<D> Default for ManifestBinding<D> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<D: ManifestDataSource> DataSource for ManifestBinding<D> {
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        D::schema()
    }

    fn read(&self, config: &Value) -> Result<ReadResponse, manifest::Error> {
        let state = manifest::read::<D>(config)?;
        Ok(ReadResponse {
            id: state.id,
            yaml: state.yaml,
        })
    }
}

/// All data sources of this provider, keyed by type name.
pub struct Provider {
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let mut provider = Self {
            data_sources: BTreeMap::new(),
        };
        provider.register::<KubevirtClusterTemplateV1Alpha1>();
        provider
    }

    fn register<D: ManifestDataSource + 'static>(&mut self) {
        self.data_sources
            .insert(D::TYPE_NAME, Box::new(ManifestBinding::<D>::default()));
    }

    /// The type names of all registered data sources, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource, UnknownDataSourceError> {
        self.data_sources
            .get(type_name)
            .map(Box::as_ref)
            .with_context(|| UnknownDataSourceSnafu {
                type_name,
                known: self.type_names().collect::<Vec<_>>(),
            })
    }
}
