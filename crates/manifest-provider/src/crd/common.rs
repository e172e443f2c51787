//! Types and attributes that recur across many custom resources.
use serde::{Deserialize, Serialize};

use crate::schema::{Attribute, attributes};

/// A reference to another Kubernetes object, mirroring `core/v1.ObjectReference`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ObjectReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// An optional attribute describing an [`ObjectReference`].
pub fn object_reference_attribute(description: &str) -> Attribute {
    Attribute::single_nested(
        description,
        attributes([
            (
                "api_version",
                Attribute::string("API version of the referent.").optional(),
            ),
            (
                "field_path",
                Attribute::string("If referring to a piece of an object instead of an entire object, this string should contain a valid JSON/Go field access statement, such as desiredState.manifest.containers[2]. For example, if the object reference is to a container within a pod, this would take on a value like: 'spec.containers{name}' (where 'name' refers to the name of the container that triggered the event) or if no container name is specified 'spec.containers[2]' (container with index 2 in this pod). This syntax is chosen only to have some well-defined way of referencing a part of an object.")
                    .optional(),
            ),
            (
                "kind",
                Attribute::string("Kind of the referent. More info: https://git.k8s.io/community/contributors/devel/sig-architecture/api-conventions.md#types-kinds")
                    .optional(),
            ),
            (
                "name",
                Attribute::string("Name of the referent. More info: https://kubernetes.io/docs/concepts/overview/working-with-objects/names/#names")
                    .optional(),
            ),
            (
                "namespace",
                Attribute::string("Namespace of the referent. More info: https://kubernetes.io/docs/concepts/overview/working-with-objects/namespaces/")
                    .optional(),
            ),
            (
                "resource_version",
                Attribute::string("Specific resourceVersion to which this reference is made, if any. More info: https://git.k8s.io/community/contributors/devel/sig-architecture/api-conventions.md#concurrency-control-and-consistency")
                    .optional(),
            ),
            (
                "uid",
                Attribute::string("UID of the referent. More info: https://kubernetes.io/docs/concepts/overview/working-with-objects/names/#uids")
                    .optional(),
            ),
        ]),
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_field_names_match_serialized_keys() {
        let attribute = object_reference_attribute("Reference.");
        let reference = ObjectReference {
            api_version: Some("v1".into()),
            field_path: Some("data".into()),
            kind: Some("Secret".into()),
            name: Some("kubeconfig".into()),
            namespace: Some("infra".into()),
            resource_version: Some("42".into()),
            uid: Some("7c1b".into()),
        };

        let serialized = serde_json::to_value(&reference).unwrap();
        let keys = serialized
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        let field_names = attribute
            .attributes()
            .unwrap()
            .values()
            .map(|attribute| attribute.field_name.clone())
            .collect::<Vec<_>>();

        assert_eq!(keys, field_names);
    }
}
