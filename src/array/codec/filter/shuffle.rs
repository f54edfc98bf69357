//! The `shuffle` filter.
//!
//! Reorders the bytes of a chunk so that the `i`-th bytes of all elements are stored contiguously, which typically improves compression.
//! Equivalent to `numcodecs.Shuffle`.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "shuffle",
//!     "elementsize": 4
//! }
//! ```

use std::sync::Arc;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    array::codec::{BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits},
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

/// The identifier for the `shuffle` filter.
pub const IDENTIFIER: &str = "shuffle";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_shuffle, create_codec_shuffle)
}

fn is_name_shuffle(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_shuffle(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: ShuffleCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = ShuffleCodec::new_with_configuration(&configuration)?;
    Ok(Codec::Filter(Arc::new(codec)))
}

/// A wrapper to handle various versions of `shuffle` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display, From)]
#[serde(untagged)]
pub enum ShuffleCodecConfiguration {
    /// Version 1.0.
    V1(ShuffleCodecConfigurationV1),
}

/// `shuffle` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ShuffleCodecConfigurationV1 {
    /// The element size in bytes.
    pub elementsize: usize,
}

/// A `shuffle` codec implementation.
#[derive(Clone, Debug)]
pub struct ShuffleCodec {
    elementsize: usize,
}

impl ShuffleCodec {
    /// Create a new `shuffle` codec.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if `elementsize` is zero.
    pub fn new(elementsize: usize) -> Result<Self, PluginCreateError> {
        if elementsize == 0 {
            Err(PluginCreateError::from(
                "the shuffle codec elementsize must be greater than zero",
            ))
        } else {
            Ok(Self { elementsize })
        }
    }

    /// Create a new `shuffle` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn new_with_configuration(
        configuration: &ShuffleCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        let ShuffleCodecConfiguration::V1(configuration) = configuration;
        Self::new(configuration.elementsize)
    }

    fn check_length(&self, len: usize) -> Result<usize, CodecError> {
        if len % self.elementsize == 0 {
            Ok(len / self.elementsize)
        } else {
            Err(CodecError::UnexpectedLength {
                len,
                element_size: self.elementsize,
            })
        }
    }
}

impl CodecTraits for ShuffleCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        let configuration = ShuffleCodecConfigurationV1 {
            elementsize: self.elementsize,
        };
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for ShuffleCodec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let count = self.check_length(decoded_value.len())?;
        let mut encoded_value = vec![0; decoded_value.len()];
        for (i, element) in decoded_value.chunks_exact(self.elementsize).enumerate() {
            for (byte_index, byte) in element.iter().enumerate() {
                encoded_value[byte_index * count + i] = *byte;
            }
        }
        Ok(encoded_value)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let count = self.check_length(encoded_value.len())?;
        let mut decoded_value = vec![0; encoded_value.len()];
        for (byte_index, plane) in encoded_value.chunks_exact(count.max(1)).enumerate() {
            for (i, byte) in plane.iter().enumerate() {
                decoded_value[i * self.elementsize + byte_index] = *byte;
            }
        }
        Ok(decoded_value)
    }
}
