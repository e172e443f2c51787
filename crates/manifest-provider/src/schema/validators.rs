use serde::{Serialize, Serializer, ser::SerializeStruct};
use serde_json::{Map, Value};
use snafu::Report;

use crate::{
    diagnostics::{AttributePath, Diagnostic, Diagnostics},
    kvp::{self, Annotation, Annotations, Label},
    validation,
};

const INVALID_VALUE: &str = "Invalid Attribute Value";

/// A check attached to an [`Attribute`](super::Attribute), run after the value passed the type
/// check.
///
/// Every variant delegates to one predicate function, so all attributes of the same semantic kind
/// (object names, label maps, annotation maps) are checked identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum Validator {
    /// The string must be at least this many bytes long.
    LengthAtLeast(usize),

    /// The string must be a valid Kubernetes object name.
    Name,

    /// Every entry of the map must be a valid Kubernetes label.
    Labels,

    /// Every entry of the map must be a valid Kubernetes annotation.
    Annotations,
}

impl Validator {
    /// A human-readable explanation of what the validator enforces.
    pub fn description(&self) -> String {
        match self {
            Self::LengthAtLeast(min) => format!("string length must be at least {min}"),
            Self::Name => "value must be a valid Kubernetes object name (RFC 1123 subdomain)".into(),
            Self::Labels => "keys and values must be valid Kubernetes labels".into(),
            Self::Annotations => "keys must be valid Kubernetes annotation keys".into(),
        }
    }

    /// Runs the check against `value` and records failures in `diagnostics`.
    ///
    /// Values of the wrong type are ignored, as they have already been reported by the type check.
    pub fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        match (self, value) {
            (Self::LengthAtLeast(min), Value::String(value)) => {
                diagnostics.extend(length_at_least(path, value, *min));
            }
            (Self::Name, Value::String(value)) => diagnostics.extend(name(path, value)),
            (Self::Labels, Value::Object(map)) => diagnostics.extend(labels(path, map)),
            (Self::Annotations, Value::Object(map)) => diagnostics.extend(annotations(path, map)),
            _ => {}
        }
    }
}

/// Validators appear in schema dumps as their type plus [`Validator::description`].
impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Validator", 2)?;
        state.serialize_field("type", self.as_ref())?;
        state.serialize_field("description", &self.description())?;
        state.end()
    }
}

fn length_at_least(path: &AttributePath, value: &str, min: usize) -> Option<Diagnostic> {
    (value.len() < min).then(|| {
        Diagnostic::attribute_error(
            path.clone(),
            INVALID_VALUE,
            format!(
                "Attribute {path} string length must be at least {min}, got: {}",
                value.len()
            ),
        )
    })
}

fn name(path: &AttributePath, value: &str) -> Option<Diagnostic> {
    validation::is_rfc_1123_subdomain(value)
        .err()
        .map(|errors| {
            Diagnostic::attribute_error(
                path.clone(),
                INVALID_VALUE,
                format!("Attribute {path} is not a valid Kubernetes object name: {errors}"),
            )
        })
}

/// Iterates over the string entries of `map`. Non-string values have already been reported.
fn string_entries(map: &Map<String, Value>) -> impl Iterator<Item = (&str, &str)> {
    map.iter()
        .filter_map(|(key, value)| Some((key.as_str(), value.as_str()?)))
}

fn labels(path: &AttributePath, map: &Map<String, Value>) -> Vec<Diagnostic> {
    string_entries(map)
        .filter_map(|(key, value)| {
            let error = Label::try_from((key, value)).err()?;
            let entry = path.map_key(key);

            Some(Diagnostic::attribute_error(
                entry.clone(),
                INVALID_VALUE,
                format!(
                    "Attribute {entry} is not a valid Kubernetes label: {}",
                    Report::from_error(error)
                ),
            ))
        })
        .collect()
}

fn annotations(path: &AttributePath, map: &Map<String, Value>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut valid = Annotations::new();

    for (key, value) in string_entries(map) {
        match Annotation::try_from((key, value)) {
            Ok(annotation) => {
                valid.insert(annotation.key, annotation.value);
            }
            Err(error) => {
                let entry = path.map_key(key);
                diagnostics.push(Diagnostic::attribute_error(
                    entry.clone(),
                    INVALID_VALUE,
                    format!(
                        "Attribute {entry} is not a valid Kubernetes annotation: {}",
                        Report::from_error(error)
                    ),
                ));
            }
        }
    }

    if let Err(error) = kvp::ensure_total_size(&valid) {
        diagnostics.push(Diagnostic::attribute_error(
            path.clone(),
            INVALID_VALUE,
            format!("Attribute {path} is too large: {error}"),
        ));
    }

    diagnostics
}
