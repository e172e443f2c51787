//! Custom resources of the `infrastructure.cluster.x-k8s.io` API group, used by Cluster API
//! infrastructure providers.

pub mod kubevirt_cluster_template_v1alpha1;

pub use kubevirt_cluster_template_v1alpha1::KubevirtClusterTemplateV1Alpha1;

/// The API group shared by all Cluster API infrastructure resources.
pub const GROUP: &str = "infrastructure.cluster.x-k8s.io";
