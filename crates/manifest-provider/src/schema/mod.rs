//! Declarative attribute schemas and the engine validating configuration against them.
//!
//! A [`Schema`] is a tree of [`Attribute`]s keyed by their snake_case names. Configuration arrives
//! as a JSON-shaped [`Value`] tree, where `null` is treated the same as an absent attribute.
//! [`Schema::validate`] walks both trees side by side and collects every problem it finds into
//! [`Diagnostics`].
use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};

mod validators;

pub use validators::*;

/// The attributes of an object, in declaration order.
pub type Attributes = IndexMap<&'static str, Attribute>;

/// Builds [`Attributes`] from `(name, attribute)` pairs, deriving each attribute's serialized
/// field name from its snake_case name.
pub fn attributes(entries: impl IntoIterator<Item = (&'static str, Attribute)>) -> Attributes {
    entries
        .into_iter()
        .map(|(name, mut attribute)| {
            attribute.field_name = Attribute::wire_name(name);
            (name, attribute)
        })
        .collect()
}

/// The top-level schema of a data source.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub description: String,
    pub markdown_description: String,
    pub attributes: Attributes,
}

impl Schema {
    pub fn new(description: impl Into<String>, attributes: Attributes) -> Self {
        let description = description.into();
        Self {
            markdown_description: description.clone(),
            description,
            attributes,
        }
    }

    /// Looks up an attribute by its path of snake_case names, descending into nested objects.
    pub fn attribute_at(&self, path: &[&str]) -> Option<&Attribute> {
        let (first, rest) = path.split_first()?;
        let mut attribute = self.attributes.get(*first)?;

        for name in rest {
            attribute = attribute.attributes()?.get(*name)?;
        }

        Some(attribute)
    }

    /// Validates `config` against this schema and returns every problem found.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::default();

        match config {
            Value::Object(_) => validate_object(
                &self.attributes,
                config,
                &AttributePath::root(),
                &mut diagnostics,
            ),
            other => diagnostics.push(Diagnostic::error(
                "Invalid Configuration",
                format!(
                    "expected the configuration to be an object, got {}",
                    value_type(other)
                ),
            )),
        }

        diagnostics
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttributeKind {
    String,
    Int64,
    StringMap,
    SingleNested { attributes: Attributes },
}

impl AttributeKind {
    fn expected(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Int64 => "an integer",
            Self::StringMap => "a map of strings",
            Self::SingleNested { .. } => "an object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int64 => value.is_i64(),
            Self::StringMap => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
            Self::SingleNested { .. } => value.is_object(),
        }
    }
}

/// A single attribute of a [`Schema`].
///
/// Attributes are created with one of the kind constructors and then flagged with exactly one
/// of [`Attribute::required`], [`Attribute::optional`] or [`Attribute::computed`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(flatten)]
    pub kind: AttributeKind,

    /// The key this attribute is serialized as in the rendered manifest.
    pub field_name: String,

    pub description: String,
    pub markdown_description: String,

    pub required: bool,
    pub optional: bool,
    pub computed: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(kind: AttributeKind, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            kind,
            field_name: String::new(),
            markdown_description: description.clone(),
            description,
            required: false,
            optional: false,
            computed: false,
            validators: Vec::new(),
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(AttributeKind::String, description)
    }

    pub fn int64(description: impl Into<String>) -> Self {
        Self::new(AttributeKind::Int64, description)
    }

    pub fn string_map(description: impl Into<String>) -> Self {
        Self::new(AttributeKind::StringMap, description)
    }

    pub fn single_nested(description: impl Into<String>, attributes: Attributes) -> Self {
        Self::new(AttributeKind::SingleNested { attributes }, description)
    }

    /// The attribute must be set in the configuration.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self.computed = false;
        self
    }

    /// The attribute may be set in the configuration.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self
    }

    /// The attribute is filled in by the data source and can never be configured.
    pub fn computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// The key an attribute called `name` is serialized as, e.g. `infraClusterSecretRef` for
    /// `infra_cluster_secret_ref`.
    pub fn wire_name(name: &str) -> String {
        name.to_case(Case::Camel)
    }

    /// Nested attributes, if this is an object attribute.
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.kind {
            AttributeKind::SingleNested { attributes } => Some(attributes),
            _ => None,
        }
    }

    fn validate(&self, path: &AttributePath, value: Option<&Value>, diagnostics: &mut Diagnostics) {
        let Some(value) = value.filter(|value| !value.is_null()) else {
            if self.required {
                diagnostics.push(Diagnostic::attribute_error(
                    path.clone(),
                    "Missing required argument",
                    format!("The argument \"{path}\" is required, but no definition was found."),
                ));
            }
            return;
        };

        if self.computed && !self.optional {
            diagnostics.push(Diagnostic::attribute_error(
                path.clone(),
                "Value for unconfigurable attribute",
                format!("Can't configure a value for \"{path}\": its value will be decided automatically."),
            ));
            return;
        }

        if !self.kind.matches(value) {
            diagnostics.push(Diagnostic::attribute_error(
                path.clone(),
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute \"{path}\": {} required, got {}.",
                    self.kind.expected(),
                    value_type(value)
                ),
            ));
            return;
        }

        for validator in &self.validators {
            validator.validate(path, value, diagnostics);
        }

        if let AttributeKind::SingleNested { attributes } = &self.kind {
            validate_object(attributes, value, path, diagnostics);
        }
    }
}

fn validate_object(
    attributes: &Attributes,
    value: &Value,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) {
    let Some(object) = value.as_object() else {
        return;
    };

    for key in object.keys() {
        if !attributes.contains_key(key.as_str()) {
            diagnostics.push(Diagnostic::attribute_error(
                path.attribute(key),
                "Unsupported argument",
                format!("An argument named \"{key}\" is not expected here."),
            ));
        }
    }

    for (name, attribute) in attributes {
        attribute.validate(&path.attribute(*name), object.get(*name), diagnostics);
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(number) if number.is_i64() => "an integer",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn endpoint_schema() -> Schema {
        Schema::new(
            "Test schema.",
            attributes([
                ("id", Attribute::string("Identifier.").computed()),
                (
                    "metadata",
                    Attribute::single_nested(
                        "Metadata.",
                        attributes([
                            (
                                "name",
                                Attribute::string("Name.")
                                    .required()
                                    .validators([Validator::Name, Validator::LengthAtLeast(1)]),
                            ),
                            (
                                "labels",
                                Attribute::string_map("Labels.")
                                    .optional()
                                    .validators([Validator::Labels]),
                            ),
                        ]),
                    )
                    .required(),
                ),
                (
                    "control_plane_endpoint",
                    Attribute::single_nested(
                        "Endpoint.",
                        attributes([
                            ("host", Attribute::string("Host.").required()),
                            ("port", Attribute::int64("Port.").required()),
                        ]),
                    )
                    .optional(),
                ),
            ]),
        )
    }

    fn summaries(diagnostics: &Diagnostics) -> Vec<(String, String)> {
        diagnostics
            .iter()
            .map(|diagnostic| {
                (
                    diagnostic
                        .path
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    diagnostic.summary.clone(),
                )
            })
            .collect()
    }

    #[rstest]
    #[case("infra_cluster_secret_ref", "infraClusterSecretRef")]
    #[case("data_secret_name", "dataSecretName")]
    #[case("type", "type")]
    fn wire_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(Attribute::wire_name(name), expected);
    }

    #[test]
    fn field_names_are_camel_case() {
        let schema = endpoint_schema();

        let endpoint = schema.attribute_at(&["control_plane_endpoint"]).unwrap();
        assert_eq!(endpoint.field_name, "controlPlaneEndpoint");

        let host = schema
            .attribute_at(&["control_plane_endpoint", "host"])
            .unwrap();
        assert_eq!(host.field_name, "host");
        assert!(schema.attribute_at(&["metadata", "missing"]).is_none());
    }

    #[test]
    fn valid_config() {
        let config = json!({
            "metadata": {"name": "demo", "labels": {"app": "web"}},
            "control_plane_endpoint": {"host": "10.0.0.1", "port": 6443},
        });

        assert!(endpoint_schema().validate(&config).is_empty());
    }

    #[test]
    fn null_counts_as_absent() {
        let config = json!({
            "id": null,
            "metadata": {"name": "demo", "labels": null},
            "control_plane_endpoint": null,
        });

        assert!(endpoint_schema().validate(&config).is_empty());
    }

    #[test]
    fn collects_every_problem() {
        let config = json!({
            "id": "default/demo",
            "metadata": {"name": "", "labels": {"app": "web-", "ok": "fine"}},
            "control_plane_endpoint": {"host": "10.0.0.1", "port": "6443"},
            "kind": "Other",
        });

        let diagnostics = endpoint_schema().validate(&config);

        assert_eq!(
            summaries(&diagnostics),
            vec![
                ("kind".to_owned(), "Unsupported argument".to_owned()),
                ("id".to_owned(), "Value for unconfigurable attribute".to_owned()),
                ("metadata.name".to_owned(), "Invalid Attribute Value".to_owned()),
                ("metadata.name".to_owned(), "Invalid Attribute Value".to_owned()),
                (
                    r#"metadata.labels["app"]"#.to_owned(),
                    "Invalid Attribute Value".to_owned()
                ),
                (
                    "control_plane_endpoint.port".to_owned(),
                    "Incorrect attribute value type".to_owned()
                ),
            ]
        );
    }

    #[rstest]
    #[case(json!({}), "metadata")]
    #[case(json!({"metadata": {}}), "metadata.name")]
    #[case(
        json!({"metadata": {"name": "demo"}, "control_plane_endpoint": {"port": 6443}}),
        "control_plane_endpoint.host"
    )]
    fn missing_required(#[case] config: Value, #[case] path: &str) {
        let diagnostics = endpoint_schema().validate(&config);

        assert_eq!(
            summaries(&diagnostics),
            vec![(path.to_owned(), "Missing required argument".to_owned())]
        );
    }

    #[rstest]
    #[case(json!("metadata"))]
    #[case(json!([1, 2]))]
    #[case(Value::Null)]
    fn non_object_config(#[case] config: Value) {
        let diagnostics = endpoint_schema().validate(&config);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.path.is_none()),
            Some(true)
        );
    }

    #[test]
    fn float_is_not_an_integer() {
        let config = json!({
            "metadata": {"name": "demo"},
            "control_plane_endpoint": {"host": "10.0.0.1", "port": 6443.5},
        });

        let diagnostics = endpoint_schema().validate(&config);
        let detail = &diagnostics.iter().next().unwrap().detail;

        assert!(detail.contains("an integer required, got a number"));
    }

    #[test]
    fn schema_serializes_with_flags() {
        let schema = serde_json::to_value(endpoint_schema()).unwrap();

        assert_eq!(
            schema["attributes"]["id"],
            json!({
                "type": "string",
                "fieldName": "id",
                "description": "Identifier.",
                "markdownDescription": "Identifier.",
                "required": false,
                "optional": false,
                "computed": true,
            })
        );
        assert_eq!(
            schema["attributes"]["metadata"]["attributes"]["name"]["validators"],
            json!([
                {
                    "type": "name",
                    "description": "value must be a valid Kubernetes object name (RFC 1123 subdomain)",
                },
                {
                    "type": "lengthAtLeast",
                    "description": "string length must be at least 1",
                },
            ])
        );
    }
}
