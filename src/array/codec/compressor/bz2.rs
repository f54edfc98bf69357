//! The `bz2` compressor.
//!
//! Compresses a chunk to a bzip2 stream, as `numcodecs.BZ2` does.
//! This compressor requires the `bz2` feature, which is disabled by default.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "bz2",
//!     "level": 9
//! }
//! ```

use std::{io::Read, sync::Arc};

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    array::codec::{BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits},
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

/// The identifier for the `bz2` compressor.
pub const IDENTIFIER: &str = "bz2";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_bz2, create_codec_bz2)
}

fn is_name_bz2(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_bz2(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: Bz2CodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = Bz2Codec::new_with_configuration(&configuration);
    Ok(Codec::Compressor(Arc::new(codec)))
}

/// A wrapper to handle various versions of `bz2` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum Bz2CodecConfiguration {
    /// Version 1.0.
    V1(Bz2CodecConfigurationV1),
}

/// Configuration parameters for the `bz2` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct Bz2CodecConfigurationV1 {
    /// The compression level.
    pub level: Bz2CompressionLevel,
}

/// A `bz2` compression level, an integer from 1 to 9.
#[derive(Serialize, Clone, Copy, Eq, PartialEq, Debug)]
pub struct Bz2CompressionLevel(u32);

impl Bz2CompressionLevel {
    /// Returns the compression level as a [`u32`].
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Bz2CompressionLevel {
    type Error = u32;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if (1..=9).contains(&level) {
            Ok(Self(level))
        } else {
            Err(level)
        }
    }
}

impl<'de> Deserialize<'de> for Bz2CompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = u32::deserialize(d)?;
        Self::try_from(level).map_err(|level| {
            serde::de::Error::custom(format!("Invalid bz2 compression level {level}, must be 1-9"))
        })
    }
}

/// A `bz2` codec implementation.
#[derive(Clone, Debug)]
pub struct Bz2Codec {
    compression: bzip2::Compression,
}

impl Bz2Codec {
    /// Create a new `bz2` codec.
    #[must_use]
    pub fn new(level: Bz2CompressionLevel) -> Self {
        Self {
            compression: bzip2::Compression::new(level.as_u32()),
        }
    }

    /// Create a new `bz2` codec from configuration.
    #[must_use]
    pub fn new_with_configuration(configuration: &Bz2CodecConfiguration) -> Self {
        let Bz2CodecConfiguration::V1(configuration) = configuration;
        Self::new(configuration.level)
    }
}

impl CodecTraits for Bz2Codec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        let configuration = Bz2CodecConfigurationV1 {
            level: Bz2CompressionLevel(self.compression.level()),
        };
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for Bz2Codec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = bzip2::read::BzEncoder::new(decoded_value.as_slice(), self.compression);
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut decoder = bzip2::read::BzDecoder::new(encoded_value.as_slice());
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
