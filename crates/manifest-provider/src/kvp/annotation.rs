//! Kubernetes annotations: keys as described in [`Key`](super::Key), values containing **any**
//! UTF-8 data.
//!
//! See <https://kubernetes.io/docs/concepts/overview/working-with-objects/annotations/>
//! for more information on Kubernetes annotations.
use std::{convert::Infallible, fmt::Display, ops::Deref, str::FromStr};

use snafu::{Snafu, ensure};

use crate::kvp::{KeyValuePair, KeyValuePairError, KeyValuePairs, Value};

/// The API server rejects objects whose annotations (keys and values summed up) exceed this size.
pub const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

/// A type alias for errors returned when construction of an annotation fails.
///
/// The value half can never fail, as [`str`] is guaranteed to only contain valid UTF-8 data,
/// which is the only requirement for a valid Kubernetes annotation value.
pub type AnnotationError = KeyValuePairError<Infallible>;

/// A validated Kubernetes annotation.
pub type Annotation = KeyValuePair<AnnotationValue>;

/// A validated set of Kubernetes annotations.
pub type Annotations = KeyValuePairs<AnnotationValue>;

#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display(
    "annotations are {size} bytes in total but must be no more than {TOTAL_ANNOTATION_SIZE_LIMIT}"
))]
pub struct AnnotationsTooLargeError {
    size: usize,
}

/// Ensures the serialized size of `annotations` stays within [`TOTAL_ANNOTATION_SIZE_LIMIT`].
pub fn ensure_total_size(annotations: &Annotations) -> Result<(), AnnotationsTooLargeError> {
    let size: usize = annotations
        .iter()
        .map(|(key, value)| key.len() + value.len())
        .sum();

    ensure!(
        size <= TOTAL_ANNOTATION_SIZE_LIMIT,
        AnnotationsTooLargeSnafu { size }
    );
    Ok(())
}

/// A Kubernetes annotation value.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnnotationValue(String);

impl Value for AnnotationValue {
    type Error = Infallible;
}

impl FromStr for AnnotationValue {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(Self(input.to_owned()))
    }
}

impl Deref for AnnotationValue {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
