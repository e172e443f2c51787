//! The `KubevirtClusterTemplate` resource of the Cluster API KubeVirt provider (CAPK).
//!
//! A `KubevirtClusterTemplate` describes the `KubevirtCluster` objects created for clusters
//! stamped out of a `ClusterClass`.
use std::collections::BTreeMap;

use const_format::concatcp;
use serde::{Deserialize, Serialize};

use crate::{
    crd::{
        common::{ObjectReference, object_reference_attribute},
        infrastructure::GROUP,
    },
    manifest::ManifestDataSource,
    schema::{Attribute, attributes},
};

/// Renders `KubevirtClusterTemplate` manifests.
pub struct KubevirtClusterTemplateV1Alpha1;

impl ManifestDataSource for KubevirtClusterTemplateV1Alpha1 {
    type Spec = KubevirtClusterTemplateSpec;

    const API_VERSION: &'static str = concatcp!(GROUP, "/v1alpha1");
    const KIND: &'static str = "KubevirtClusterTemplate";
    const TYPE_NAME: &'static str =
        "k8s_infrastructure_cluster_x_k8s_io_kubevirt_cluster_template_v1alpha1_manifest";

    fn description() -> &'static str {
        "KubevirtClusterTemplate is the Schema for the kubevirtclustertemplates API."
    }

    fn spec_attribute() -> Attribute {
        Attribute::single_nested(
            "KubevirtClusterTemplateSpec defines the desired state of KubevirtClusterTemplate.",
            attributes([("template", template_attribute())]),
        )
        .optional()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct KubevirtClusterTemplateSpec {
    pub template: KubevirtClusterTemplateResource,
}

/// The data needed to create a `KubevirtCluster` from a template.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct KubevirtClusterTemplateResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TemplateMetadata>,

    pub spec: KubevirtClusterSpec,
}

/// The customizable subset of `metav1.ObjectMeta` carried by templates.
///
/// The maps skip serialization only when `None`. A map configured as empty is rendered as `{}`,
/// so an absent map and an empty one stay distinguishable in the manifest.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct TemplateMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct KubevirtClusterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<ApiEndpoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_service_template: Option<ControlPlaneServiceTemplate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infra_cluster_secret_ref: Option<ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<SshKeys>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ApiEndpoint {
    pub host: String,
    pub port: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ControlPlaneServiceTemplate {
    /// Skipped only when `None`, like [`TemplateMetadata`]: an empty map is rendered as `{}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<ServiceSpecOverride>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ServiceSpecOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct SshKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_ref: Option<ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_secret_name: Option<String>,
}

fn template_attribute() -> Attribute {
    Attribute::single_nested(
        "KubevirtClusterTemplateResource describes the data needed to create a KubevirtCluster from a template.",
        attributes([
            (
                "metadata",
                Attribute::single_nested(
                    "ObjectMeta is metadata that all persisted resources must have, which includes all objects users must create. This is a copy of customizable fields from metav1.ObjectMeta.",
                    attributes([
                        (
                            "annotations",
                            Attribute::string_map("Annotations is an unstructured key value map stored with a resource that may be set by external tools to store and retrieve arbitrary metadata. They are not queryable and should be preserved when modifying objects. More info: http://kubernetes.io/docs/user-guide/annotations")
                                .optional(),
                        ),
                        (
                            "labels",
                            Attribute::string_map("Map of string keys and values that can be used to organize and categorize (scope and select) objects. May match selectors of replication controllers and services. More info: http://kubernetes.io/docs/user-guide/labels")
                                .optional(),
                        ),
                    ]),
                )
                .optional(),
            ),
            ("spec", cluster_spec_attribute()),
        ]),
    )
    .required()
}

fn cluster_spec_attribute() -> Attribute {
    Attribute::single_nested(
        "KubevirtClusterSpec defines the desired state of KubevirtCluster.",
        attributes([
            (
                "control_plane_endpoint",
                Attribute::single_nested(
                    "ControlPlaneEndpoint represents the endpoint used to communicate with the control plane.",
                    attributes([
                        (
                            "host",
                            Attribute::string("The hostname on which the API server is serving.")
                                .required(),
                        ),
                        (
                            "port",
                            Attribute::int64("The port on which the API server is serving.")
                                .required(),
                        ),
                    ]),
                )
                .optional(),
            ),
            (
                "control_plane_service_template",
                Attribute::single_nested(
                    "ControlPlaneServiceTemplate can be used to modify service that fronts the control plane nodes to handle the api-server traffic (port 6443). This field is optional, by default control plane nodes will use a service of type ClusterIP, which will make workload cluster only accessible within the same cluster. Note, this does not aim to expose the entire Service spec to users, but only provides capability to modify the service metadata and the service type.",
                    attributes([
                        (
                            "metadata",
                            Attribute::string_map("Service metadata allows to set labels and annotations for the service. This field is optional.")
                                .optional(),
                        ),
                        (
                            "spec",
                            Attribute::single_nested(
                                "Service specification allows to override some fields in the service spec. Note, it does not aim cover all fields of the service spec.",
                                attributes([(
                                    "type",
                                    Attribute::string("Type determines how the Service is exposed. Defaults to ClusterIP. Valid options are ExternalName, ClusterIP, NodePort, and LoadBalancer. More info: https://kubernetes.io/docs/concepts/services-networking/service/#publishing-services-service-types")
                                        .optional(),
                                )]),
                            )
                            .optional(),
                        ),
                    ]),
                )
                .optional(),
            ),
            (
                "infra_cluster_secret_ref",
                object_reference_attribute("InfraClusterSecretRef is a reference to a secret with a kubeconfig for external cluster. If InfraClusterSecretRef is not specified, current cluster will be used instead."),
            ),
            (
                "ssh_keys",
                Attribute::single_nested(
                    "SSHKeys is a reference to a local struct for SSH keys persistence.",
                    attributes([
                        (
                            "config_ref",
                            object_reference_attribute("ConfigRef is a reference to a resource containing the keys. The reference is optional to allow users/operators to specify Bootstrap.DataSecretName without the need of a controller."),
                        ),
                        (
                            "data_secret_name",
                            Attribute::string("DataSecretName is the name of the secret that stores ssh keys.")
                                .optional(),
                        ),
                    ]),
                )
                .optional(),
            ),
        ]),
    )
    .required()
}
