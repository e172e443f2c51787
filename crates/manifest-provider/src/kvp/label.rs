//! Kubernetes labels: keys as described in [`Key`](super::Key), values limited to a short,
//! restricted set of ASCII characters.
//!
//! See <https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/>
//! for more information on Kubernetes labels.
use std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};

use snafu::{Snafu, ensure};

use crate::kvp::{KeyValuePair, KeyValuePairError, KeyValuePairs, Value, key::KEY_NAME_REGEX};

const LABEL_VALUE_MAX_LEN: usize = 63;

/// A type alias for errors returned when construction of a label fails.
pub type LabelError = KeyValuePairError<LabelValueError>;

/// A validated Kubernetes label.
///
/// ```
/// # use manifest_provider::kvp::Label;
/// let label = Label::try_from(("cluster.x-k8s.io/provider", "infrastructure-kubevirt")).unwrap();
/// assert_eq!(label.to_string(), "cluster.x-k8s.io/provider=infrastructure-kubevirt");
/// ```
pub type Label = KeyValuePair<LabelValue>;

/// A validated set of Kubernetes labels.
pub type Labels = KeyValuePairs<LabelValue>;

/// The error type for label value parse/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum LabelValueError {
    #[snafu(display(
        "value exceeds the maximum length - expected 63 characters or less, got {length}"
    ))]
    ValueTooLong { length: usize },

    #[snafu(display("value contains non-ascii characters"))]
    ValueNotAscii,

    #[snafu(display("value violates kubernetes format"))]
    ValueInvalid,
}

/// A validated Kubernetes label value. Unlike key names, values may be empty.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LabelValue(String);

impl Debug for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Value for LabelValue {
    type Error = LabelValueError;
}

impl FromStr for LabelValue {
    type Err = LabelValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(
            input.len() <= LABEL_VALUE_MAX_LEN,
            ValueTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), ValueNotAsciiSnafu);
        ensure!(
            input.is_empty() || KEY_NAME_REGEX.is_match(input),
            ValueInvalidSnafu
        );

        Ok(Self(input.to_owned()))
    }
}

impl Deref for LabelValue {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a".repeat(64), LabelValueError::ValueTooLong { length: 64 })]
    #[case("foo-".to_owned(), LabelValueError::ValueInvalid)]
    #[case("foo bar".to_owned(), LabelValueError::ValueInvalid)]
    #[case("ä".to_owned(), LabelValueError::ValueNotAscii)]
    fn invalid_value(#[case] input: String, #[case] error: LabelValueError) {
        let err = LabelValue::from_str(&input).unwrap_err();
        assert_eq!(err, error);
    }

    #[rstest]
    #[case("")]
    #[case("v1alpha1")]
    #[case("infrastructure-kubevirt")]
    #[case("my_value.1")]
    fn valid_value(#[case] input: &str) {
        assert_eq!(&*LabelValue::from_str(input).unwrap(), input);
    }
}
