//! Rendering of Kubernetes custom resources as YAML manifests.
//!
//! Every manifest data source follows the same flow: validate the configuration against the
//! data source's [`Schema`], decode it into typed [`ManifestConfig`], stamp in the fixed
//! `apiVersion` and `kind`, and serialize the result. Concrete data sources only implement
//! [`ManifestDataSource`], which supplies the constants, the spec type and its attributes.
use std::{collections::BTreeMap, fmt::Debug};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::TypeMeta;
use manifest_shared::yaml::{self, SerializeOptions, YamlDocument};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::{ResultExt, Snafu, ensure};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    schema::{Attribute, Schema, Validator, attributes},
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("configuration is invalid: {diagnostics}"))]
    Validation { diagnostics: Diagnostics },

    #[snafu(display("failed to serialize {kind} manifest"))]
    Serialization {
        source: yaml::Error,
        kind: &'static str,
    },
}

impl Error {
    /// Converts the error into the diagnostics reported back to the host.
    ///
    /// Validation errors expand into every collected diagnostic, serialization errors become a
    /// single diagnostic carrying the full error chain.
    pub fn to_diagnostics(&self) -> Diagnostics {
        match self {
            Self::Validation { diagnostics } => diagnostics.clone(),
            Self::Serialization { .. } => Diagnostics::from_iter([Diagnostic::error(
                "Unable to render manifest",
                snafu::Report::from_error(self).to_string(),
            )]),
        }
    }
}

/// A Kubernetes custom resource exposed as a read-only manifest data source.
pub trait ManifestDataSource {
    /// The name the host refers to this data source by.
    const TYPE_NAME: &'static str;

    /// The `apiVersion` stamped into every rendered manifest.
    const API_VERSION: &'static str;

    /// The `kind` stamped into every rendered manifest.
    const KIND: &'static str;

    /// The typed `spec` of the custom resource.
    ///
    /// It is deserialized from snake_case configuration keys and serialized with the camelCase
    /// keys of the CRD.
    type Spec: Serialize + DeserializeOwned + Clone + Debug + PartialEq;

    fn description() -> &'static str;

    /// The attribute describing [`Self::Spec`].
    fn spec_attribute() -> Attribute;

    fn schema() -> Schema {
        manifest_schema(Self::description(), Self::spec_attribute())
    }
}

/// Builds the schema shared by all manifest data sources around the given `spec` attribute.
pub fn manifest_schema(description: &str, spec: Attribute) -> Schema {
    Schema::new(
        description,
        attributes([
            (
                "id",
                Attribute::string("Contains the value 'metadata.namespace/metadata.name'.")
                    .computed(),
            ),
            (
                "yaml",
                Attribute::string("The generated manifest in YAML format.").computed(),
            ),
            ("metadata", metadata_attribute()),
            ("spec", spec),
        ]),
    )
}

/// The `metadata` attribute of a namespaced object.
pub fn metadata_attribute() -> Attribute {
    Attribute::single_nested(
        "Data that helps uniquely identify the object.",
        attributes([
            (
                "name",
                Attribute::string("Unique identifier for this object within the namespace. See https://kubernetes.io/docs/concepts/overview/working-with-objects/names/#names for more details.")
                    .required()
                    .validators([Validator::Name, Validator::LengthAtLeast(1)]),
            ),
            (
                "namespace",
                Attribute::string("Namespace for this object. See https://kubernetes.io/docs/concepts/overview/working-with-objects/namespaces/ for more details.")
                    .required()
                    .validators([Validator::Name, Validator::LengthAtLeast(1)]),
            ),
            (
                "labels",
                Attribute::string_map("Keys and values that can be used to organize and categorize objects. See https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/ for more details.")
                    .optional()
                    .validators([Validator::Labels]),
            ),
            (
                "annotations",
                Attribute::string_map("Unstructured key value map stored with a resource that may be set by external tools. See https://kubernetes.io/docs/concepts/overview/working-with-objects/annotations/ for more details.")
                    .optional()
                    .validators([Validator::Annotations]),
            ),
        ]),
    )
    .required()
}

/// The configured `metadata` of a manifest.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub name: String,
    pub namespace: String,
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ObjectMetadata {
    /// Converts into [`ObjectMeta`], dropping empty label and annotation maps.
    fn to_object_meta(&self) -> ObjectMeta {
        let non_empty = |map: &Option<BTreeMap<String, String>>| {
            map.as_ref().filter(|map| !map.is_empty()).cloned()
        };

        ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: non_empty(&self.labels),
            annotations: non_empty(&self.annotations),
            ..ObjectMeta::default()
        }
    }
}

/// The complete configuration of a manifest data source, minus the computed attributes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ManifestConfig<S> {
    pub metadata: ObjectMetadata,
    pub spec: Option<S>,
}

/// The outcome of a read: the configuration plus the computed `id` and `yaml` attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestState<S> {
    /// Always `<namespace>/<name>`.
    pub id: String,
    pub yaml: String,
    pub config: ManifestConfig<S>,
}

#[derive(Serialize)]
struct ManifestDocument<'a, S> {
    #[serde(flatten)]
    types: TypeMeta,
    metadata: ObjectMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec: Option<&'a S>,
}

/// Validates and decodes `config`, then renders it. See [`render`].
#[tracing::instrument(skip(config), fields(type_name = D::TYPE_NAME))]
pub fn read<D: ManifestDataSource>(config: &Value) -> Result<ManifestState<D::Spec>> {
    tracing::debug!("validating configuration");
    let diagnostics = D::schema().validate(config);
    ensure!(!diagnostics.has_error(), ValidationSnafu { diagnostics });

    let config = ManifestConfig::<D::Spec>::deserialize(config).map_err(|error| {
        Error::Validation {
            diagnostics: Diagnostics::from_iter([Diagnostic::error(
                "Unable to decode configuration",
                error.to_string(),
            )]),
        }
    })?;

    render::<D>(config)
}

/// Computes the `id` and serializes the manifest with the constants of `D`.
pub fn render<D: ManifestDataSource>(
    config: ManifestConfig<D::Spec>,
) -> Result<ManifestState<D::Spec>> {
    let id = format!("{}/{}", config.metadata.namespace, config.metadata.name);

    let document = ManifestDocument {
        types: TypeMeta {
            api_version: D::API_VERSION.to_owned(),
            kind: D::KIND.to_owned(),
        },
        metadata: config.metadata.to_object_meta(),
        spec: config.spec.as_ref(),
    };

    let yaml = document
        .to_yaml_string(SerializeOptions::manifest())
        .context(SerializationSnafu { kind: D::KIND })?;

    tracing::debug!(id, kind = D::KIND, "rendered manifest");

    Ok(ManifestState { id, yaml, config })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde::{Serializer, ser::Error as _};
    use serde_json::json;

    use super::*;
    use crate::schema::Attributes;

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[serde(rename_all(serialize = "camelCase"))]
    struct WidgetSpec {
        replica_count: Option<i64>,
    }

    struct Widget;

    impl ManifestDataSource for Widget {
        type Spec = WidgetSpec;

        const API_VERSION: &'static str = "example.com/v1";
        const KIND: &'static str = "Widget";
        const TYPE_NAME: &'static str = "k8s_example_com_widget_v1_manifest";

        fn description() -> &'static str {
            "Widgets."
        }

        fn spec_attribute() -> Attribute {
            Attribute::single_nested(
                "Spec.",
                attributes([("replica_count", Attribute::int64("Replicas.").optional())]),
            )
            .optional()
        }
    }

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    struct BrokenSpec {}

    impl Serialize for BrokenSpec {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("spec cannot be represented"))
        }
    }

    struct Broken;

    impl ManifestDataSource for Broken {
        type Spec = BrokenSpec;

        const API_VERSION: &'static str = "example.com/v1";
        const KIND: &'static str = "Broken";
        const TYPE_NAME: &'static str = "k8s_example_com_broken_v1_manifest";

        fn description() -> &'static str {
            "Broken."
        }

        fn spec_attribute() -> Attribute {
            Attribute::single_nested("Spec.", Attributes::new()).optional()
        }
    }

    #[test]
    fn renders_manifest() {
        let config = json!({
            "metadata": {"name": "demo", "namespace": "default", "labels": {"app": "web"}},
            "spec": {"replica_count": 3},
        });

        let state = read::<Widget>(&config).unwrap();

        assert_eq!(state.id, "default/demo");
        assert_eq!(
            state.yaml,
            indoc! {"
                apiVersion: example.com/v1
                kind: Widget
                metadata:
                  labels:
                    app: web
                  name: demo
                  namespace: default
                spec:
                  replicaCount: 3
            "}
        );
        assert_eq!(
            state.config.spec,
            Some(WidgetSpec {
                replica_count: Some(3)
            })
        );
    }

    #[test]
    fn empty_maps_and_absent_spec_are_omitted() {
        let config = json!({
            "metadata": {"name": "demo", "namespace": "default", "labels": {}, "annotations": {}},
        });

        let state = read::<Widget>(&config).unwrap();

        assert_eq!(
            state.yaml,
            indoc! {"
                apiVersion: example.com/v1
                kind: Widget
                metadata:
                  name: demo
                  namespace: default
            "}
        );
    }

    #[test]
    fn computed_attributes_cannot_be_configured() {
        let config = json!({
            "id": "other/id",
            "yaml": "kind: Other",
            "metadata": {"name": "demo", "namespace": "default"},
        });

        let err = read::<Widget>(&config).unwrap_err();
        let diagnostics = err.to_diagnostics();

        assert_eq!(diagnostics.len(), 2);
        assert!(
            diagnostics
                .iter()
                .all(|d| d.summary == "Value for unconfigurable attribute")
        );
    }

    #[test]
    fn serialization_failure_yields_no_result() {
        let config = json!({
            "metadata": {"name": "demo", "namespace": "default"},
            "spec": {},
        });

        let err = read::<Broken>(&config).unwrap_err();
        assert!(matches!(err, Error::Serialization { kind: "Broken", .. }));

        let diagnostics = err.to_diagnostics();
        assert_eq!(diagnostics.len(), 1);

        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Unable to render manifest");
        assert!(diagnostic.detail.contains("spec cannot be represented"));
    }
}
