use indoc::indoc;
use manifest_provider::{Provider, diagnostics::Diagnostics};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TYPE_NAME: &str =
    "k8s_infrastructure_cluster_x_k8s_io_kubevirt_cluster_template_v1alpha1_manifest";

#[fixture]
fn provider() -> Provider {
    Provider::new()
}

fn diagnostics(provider: &Provider, config: &Value) -> Diagnostics {
    provider
        .data_source(TYPE_NAME)
        .unwrap()
        .read(config)
        .unwrap_err()
        .to_diagnostics()
}

#[rstest]
fn renders_through_the_registry(provider: Provider) {
    let config: Value = serde_yaml::from_str(indoc! {"
        metadata:
          name: demo
          namespace: default
        spec:
          template:
            spec:
              control_plane_endpoint:
                host: 10.0.0.1
                port: 6443
    "})
    .unwrap();

    let response = provider.data_source(TYPE_NAME).unwrap().read(&config).unwrap();

    assert_eq!(response.id, "default/demo");
    assert_eq!(
        response.yaml,
        indoc! {"
            apiVersion: infrastructure.cluster.x-k8s.io/v1alpha1
            kind: KubevirtClusterTemplate
            metadata:
              name: demo
              namespace: default
            spec:
              template:
                spec:
                  controlPlaneEndpoint:
                    host: 10.0.0.1
                    port: 6443
        "}
    );
}

#[rstest]
fn reports_every_problem_at_once(provider: Provider) {
    let config = json!({
        "metadata": {
            "name": "Demo",
            "namespace": "",
            "labels": {"app": "-web"}
        },
        "spec": {
            "template": {
                "spec": {
                    "control_plane_endpoint": {"host": "10.0.0.1", "port": "6443"},
                    "ssh_keys": {"data_secret_name": 7}
                }
            }
        }
    });

    let paths = diagnostics(&provider, &config)
        .iter()
        .filter_map(|diagnostic| diagnostic.path.as_ref().map(ToString::to_string))
        .collect::<Vec<_>>();

    assert_eq!(
        paths,
        vec![
            "metadata.name",
            "metadata.namespace",
            "metadata.namespace",
            r#"metadata.labels["app"]"#,
            "spec.template.spec.control_plane_endpoint.port",
            "spec.template.spec.ssh_keys.data_secret_name",
        ]
    );
}

#[rstest]
#[case::id("id")]
#[case::yaml("yaml")]
fn computed_attributes_are_rejected(provider: Provider, #[case] attribute: &str) {
    let mut config = json!({"metadata": {"name": "demo", "namespace": "default"}});
    config[attribute] = json!("anything");

    let diagnostics = diagnostics(&provider, &config);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().map(|d| d.summary.as_str()),
        Some("Value for unconfigurable attribute")
    );
}

#[rstest]
fn schema_is_serializable(provider: Provider) {
    let schema = serde_json::to_value(provider.data_source(TYPE_NAME).unwrap().schema()).unwrap();
    let endpoint = &schema["attributes"]["spec"]["attributes"]["template"]["attributes"]["spec"]
        ["attributes"]["control_plane_endpoint"];

    assert_eq!(endpoint["type"], "singleNested");
    assert_eq!(endpoint["fieldName"], "controlPlaneEndpoint");
    assert_eq!(endpoint["attributes"]["port"]["type"], "int64");
    assert_eq!(endpoint["attributes"]["port"]["required"], true);
}
