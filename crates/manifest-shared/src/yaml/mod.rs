//! Utility functions for processing data in the YAML file format
use std::io::Write;

use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to deserialize YAML"))]
    DeserializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// For most people the default implementation [`SerializeOptions::default()`] is sufficient as it
/// enables explicit document and singleton map serialization. Kubernetes manifests handed to
/// other tools are usually rendered with [`SerializeOptions::manifest()`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            singleton_map: true,
        }
    }
}

impl SerializeOptions {
    /// Options producing a bare document: no leading separator and no enum rewriting.
    pub const fn manifest() -> Self {
        Self {
            explicit_document: false,
            singleton_map: false,
        }
    }
}

/// Renders any type `T` which is [serializable](serde::Serialize) as a YAML string using the
/// provided [`SerializeOptions`].
pub trait YamlDocument: serde::Serialize + Sized {
    /// Serializes `self` into a YAML [`String`].
    fn to_yaml_string(&self, options: SerializeOptions) -> Result<String> {
        let mut buffer = Vec::new();
        serialize(self, &mut buffer, options)?;

        String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
    }
}

impl<T> YamlDocument for T where T: serde::Serialize {}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: serde::Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Parses `input` into a generic YAML value and renders it again.
///
/// Output produced by [`serialize`] is a fixed point of this function, which makes it useful to
/// check that a document survives a trip through other YAML tooling unchanged.
pub fn reformat(input: &str, options: SerializeOptions) -> Result<String> {
    let value: serde_yaml::Value = serde_yaml::from_str(input).context(DeserializeYamlSnafu)?;
    value.to_yaml_string(options)
}
