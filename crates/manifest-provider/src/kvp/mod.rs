//! Parsing and validation of Kubernetes key/value pairs, like labels and annotations.
use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};

use snafu::{ResultExt, Snafu};

mod annotation;
mod key;
mod label;

pub use annotation::*;
pub use key::*;
pub use label::*;

/// The error type for key/value pair parsing/validating operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyValuePairError<E>
where
    E: std::error::Error + 'static,
{
    #[snafu(display("failed to parse key {key:?} of key/value pair"))]
    InvalidKey { source: KeyError, key: String },

    #[snafu(display("failed to parse value {value:?} for key {key:?}", key = key.to_string()))]
    InvalidValue { source: E, key: Key, value: String },
}

/// The value half of a [`KeyValuePair`].
///
/// Implementors decide which strings are acceptable through their [`FromStr`] implementation.
pub trait Value:
    Deref<Target = str> + FromStr<Err = Self::Error> + Clone + Display + Eq + Ord
{
    type Error: std::error::Error + 'static;
}

/// A validated Kubernetes key/value pair, parsed from a `(str, str)` tuple.
///
/// Both the key (comprised of optional prefix and name) and the value are
/// validated, see [`Key`] and the [`Value`] implementations [`LabelValue`] and
/// [`AnnotationValue`].
///
/// ```
/// # use manifest_provider::kvp::Label;
/// let label = Label::try_from(("app.kubernetes.io/name", "capk")).unwrap();
/// assert_eq!(label.to_string(), "app.kubernetes.io/name=capk");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyValuePair<V>
where
    V: Value,
{
    pub key: Key,
    pub value: V,
}

impl<V> TryFrom<(&str, &str)> for KeyValuePair<V>
where
    V: Value,
{
    type Error = KeyValuePairError<V::Error>;

    fn try_from((key, value): (&str, &str)) -> Result<Self, Self::Error> {
        let key = Key::from_str(key).context(InvalidKeySnafu { key })?;
        let value = V::from_str(value).context(InvalidValueSnafu {
            key: key.clone(),
            value,
        })?;
        Ok(Self { key, value })
    }
}

impl<V: Value> Display for KeyValuePair<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<V: Value + Debug> Debug for KeyValuePair<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {:?}", self.key, self.value)
    }
}

/// A validated set of Kubernetes key/value pairs.
///
/// See [`Annotations`] and [`Labels`] for actual instantiations.
pub type KeyValuePairs<V> = BTreeMap<Key, V>;

#[cfg(test)]
mod tests {
    use snafu::Report;

    use super::*;

    #[test]
    fn try_from_tuple() {
        let label = Label::try_from(("cluster.x-k8s.io/cluster-name", "demo")).unwrap();

        assert_eq!(
            label.key,
            Key::from_str("cluster.x-k8s.io/cluster-name").unwrap()
        );
        assert_eq!(label.value, LabelValue::from_str("demo").unwrap());
    }

    #[test]
    fn key_error() {
        let err = Label::try_from(("exämple.com/app", "web")).unwrap_err();

        assert!(matches!(err, KeyValuePairError::InvalidKey { .. }));
        assert_eq!(
            err.to_string(),
            "failed to parse key \"exämple.com/app\" of key/value pair"
        );

        let report = Report::from_error(err).to_string();
        assert!(report.contains("prefix segment of key contains non-ascii characters"));
    }

    #[test]
    fn value_error() {
        let err = Label::try_from(("app", "wéb")).unwrap_err();

        assert_eq!(
            err,
            KeyValuePairError::InvalidValue {
                source: LabelValueError::ValueNotAscii,
                key: Key::from_str("app").unwrap(),
                value: "wéb".to_owned(),
            }
        );
    }
}
