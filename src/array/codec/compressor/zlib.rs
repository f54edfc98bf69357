//! The `zlib` compressor.
//!
//! Compresses a chunk to a zlib stream, as `numcodecs.Zlib` does.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "zlib",
//!     "level": 1
//! }
//! ```

use std::{
    io::{Cursor, Read},
    sync::Arc,
};

use derive_more::{Display, From};
use flate2::bufread::{ZlibDecoder, ZlibEncoder};
use serde::{Deserialize, Serialize};

use crate::{
    array::codec::{
        BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits,
    },
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::{DeflateCompressionLevel, DeflateCompressionLevelError};

/// The identifier for the `zlib` compressor.
pub const IDENTIFIER: &str = "zlib";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_zlib, create_codec_zlib)
}

fn is_name_zlib(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_zlib(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: ZlibCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = ZlibCodec::new_with_configuration(&configuration);
    Ok(Codec::Compressor(Arc::new(codec)))
}

/// A wrapper to handle various versions of `zlib` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum ZlibCodecConfiguration {
    /// Version 1.0.
    V1(ZlibCodecConfigurationV1),
}

/// Configuration parameters for the `zlib` codec (version 1.0).
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ZlibCodecConfigurationV1 {
    /// The compression level.
    pub level: DeflateCompressionLevel,
}

/// A `zlib` codec implementation.
#[derive(Clone, Debug)]
pub struct ZlibCodec {
    compression_level: DeflateCompressionLevel,
}

impl ZlibCodec {
    /// Create a new `zlib` codec.
    ///
    /// # Errors
    /// Returns [`DeflateCompressionLevelError`] if `compression_level` is not valid.
    pub fn new(compression_level: u32) -> Result<Self, DeflateCompressionLevelError> {
        Ok(Self {
            compression_level: compression_level.try_into()?,
        })
    }

    /// Create a new `zlib` codec from configuration.
    #[must_use]
    pub const fn new_with_configuration(configuration: &ZlibCodecConfiguration) -> Self {
        let ZlibCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression_level: configuration.level,
        }
    }
}

impl CodecTraits for ZlibCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        let configuration = ZlibCodecConfigurationV1 {
            level: self.compression_level,
        };
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for ZlibCodec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = ZlibEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut decoder = ZlibDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
