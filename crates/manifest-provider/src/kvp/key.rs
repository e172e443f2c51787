use std::{fmt::Display, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{ResultExt, Snafu, ensure};

const KEY_PREFIX_MAX_LEN: usize = 253;
const KEY_NAME_MAX_LEN: usize = 63;

// Lazily initialized regular expressions
static KEY_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("failed to compile key prefix regex")
});

pub(super) static KEY_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9A-Z]([a-z0-9A-Z-_.]*[a-z0-9A-Z]+)?$")
        .expect("failed to compile key name regex")
});

/// The error type for key parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyError {
    /// The key must at least contain a name. The prefix is optional.
    #[snafu(display("key input cannot be empty"))]
    EmptyInput,

    /// Keys like `example.com/nested/name` contain more than one slash.
    #[snafu(display("key prefixes cannot be nested, only use a single slash"))]
    NestedPrefix,

    #[snafu(display("failed to parse key prefix"))]
    KeyPrefixError { source: KeyPrefixError },

    #[snafu(display("failed to parse key name"))]
    KeyNameError { source: KeyNameError },
}

/// The key of a label or annotation, in the format `(<PREFIX>/)<NAME>`.
///
/// The rules for both segments are described in the Kubernetes documentation
/// [here][k8s-labels]. A [`Key`] can only be obtained by parsing, so holding
/// one means the key is valid.
///
/// [k8s-labels]: https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/#syntax-and-character-set
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    prefix: Option<KeyPrefix>,
    name: KeyName,
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), EmptyInputSnafu);

        let (prefix, name) = match input.split_once('/') {
            None => (None, input),
            Some((_, name)) if name.contains('/') => return NestedPrefixSnafu.fail(),
            Some((prefix, name)) => (Some(prefix), name),
        };

        Ok(Self {
            prefix: prefix
                .map(KeyPrefix::from_str)
                .transpose()
                .context(KeyPrefixSnafu)?,
            name: KeyName::from_str(name).context(KeyNameSnafu)?,
        })
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}/{}", prefix, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Key {
    /// Retrieves the key's prefix, e.g. `app.kubernetes.io` for `app.kubernetes.io/name`.
    pub fn prefix(&self) -> Option<&KeyPrefix> {
        self.prefix.as_ref()
    }

    /// Retrieves the key's name, e.g. `name` for `app.kubernetes.io/name`.
    pub fn name(&self) -> &KeyName {
        &self.name
    }

    /// Number of bytes this key occupies in the serialized object.
    pub fn len(&self) -> usize {
        self.prefix.as_ref().map_or(0, |prefix| prefix.len() + 1) + self.name.len()
    }

    /// Always `false`, as every key carries a non-empty name.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The error type for key prefix parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyPrefixError {
    /// Keys like `/name` announce a prefix but don't provide one.
    #[snafu(display("prefix segment of key cannot be empty"))]
    PrefixEmpty,

    #[snafu(display(
        "prefix segment of key exceeds the maximum length - expected 253 characters or less, got {length}"
    ))]
    PrefixTooLong { length: usize },

    #[snafu(display("prefix segment of key contains non-ascii characters"))]
    PrefixNotAscii,

    /// The prefix must be a lowercase DNS subdomain.
    #[snafu(display("prefix segment of key violates kubernetes format"))]
    PrefixInvalid,
}

/// A validated optional key prefix segment of a key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPrefix(String);

impl FromStr for KeyPrefix {
    type Err = KeyPrefixError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), PrefixEmptySnafu);
        ensure!(
            input.len() <= KEY_PREFIX_MAX_LEN,
            PrefixTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), PrefixNotAsciiSnafu);
        ensure!(KEY_PREFIX_REGEX.is_match(input), PrefixInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyPrefix {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The error type for key name parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyNameError {
    #[snafu(display("name segment of key cannot be empty"))]
    NameEmpty,

    #[snafu(display(
        "name segment of key exceeds the maximum length - expected 63 characters or less, got {length}"
    ))]
    NameTooLong { length: usize },

    #[snafu(display("name segment of key contains non-ascii characters"))]
    NameNotAscii,

    #[snafu(display("name segment of key violates kubernetes format"))]
    NameInvalid,
}

/// A validated name segment of a key. This part of the key is required.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyName(String);

impl FromStr for KeyName {
    type Err = KeyNameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), NameEmptySnafu);
        ensure!(
            input.len() <= KEY_NAME_MAX_LEN,
            NameTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), NameNotAsciiSnafu);
        ensure!(KEY_NAME_REGEX.is_match(input), NameInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
