//! Chunk codecs.
//!
//! A Zarr V2 chunk is encoded by an ordered list of filters followed by an optional compressor.
//! Each is a bidirectional transform (an encode transform and a decode transform) described by `numcodecs` style metadata, e.g. `{"id": "zlib", "level": 1}`.
//!  - Filters are reversible, order significant, transforms of the elements of a chunk (e.g. `delta`, `shuffle`, `fixedscaleoffset`).
//!  - A compressor is a general purpose byte stream compressor (e.g. `gzip`, `zlib`, `zstd`, `bz2`).
//!
//! A [`CodecChain`] encodes by applying each filter in declared order and then the compressor, and decodes in reverse.
//! [`encode_chunk`] is a convenience wrapper that builds the chain from metadata and encodes a single chunk.

pub mod compressor;
pub mod filter;

mod codec_chain;
mod numeric;

pub use codec_chain::CodecChain;

#[cfg(feature = "bz2")]
pub use compressor::bz2::{Bz2Codec, Bz2CodecConfiguration, Bz2CodecConfigurationV1};
#[cfg(feature = "gzip")]
pub use compressor::gzip::{GzipCodec, GzipCodecConfiguration, GzipCodecConfigurationV1};
#[cfg(feature = "gzip")]
pub use compressor::zlib::{ZlibCodec, ZlibCodecConfiguration, ZlibCodecConfigurationV1};
#[cfg(feature = "zstd")]
pub use compressor::zstd::{ZstdCodec, ZstdCodecConfiguration, ZstdCodecConfigurationV1};
pub use filter::{
    delta::{DeltaCodec, DeltaCodecConfiguration, DeltaCodecConfigurationV1},
    fixedscaleoffset::{
        FixedScaleOffsetCodec, FixedScaleOffsetCodecConfiguration,
        FixedScaleOffsetCodecConfigurationV1,
    },
    shuffle::{ShuffleCodec, ShuffleCodecConfiguration, ShuffleCodecConfigurationV1},
};

use std::sync::Arc;

use thiserror::Error;

use crate::{
    metadata::MetadataV2,
    plugin::{Plugin, PluginCreateError},
};

use super::DataType;

/// A codec plugin.
pub type CodecPlugin = Plugin<Codec>;
inventory::collect!(CodecPlugin);

/// A filter or compressor codec.
#[derive(Debug, Clone)]
pub enum Codec {
    /// A filter, a reversible transform of the elements of a chunk.
    Filter(Arc<dyn BytesToBytesCodecTraits>),
    /// A compressor.
    Compressor(Arc<dyn BytesToBytesCodecTraits>),
}

impl Codec {
    /// Create a codec from metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PluginCreateError`] if the metadata is invalid or not associated with a registered codec plugin.
    pub fn from_metadata(metadata: &MetadataV2) -> Result<Self, PluginCreateError> {
        for plugin in inventory::iter::<CodecPlugin> {
            if plugin.match_name(metadata.id()) {
                return plugin.create(metadata);
            }
        }
        Err(PluginCreateError::Unsupported {
            name: metadata.id().to_string(),
            plugin_type: "codec".to_string(),
        })
    }

    /// Return the underlying codec.
    #[must_use]
    pub fn as_bytes_to_bytes(&self) -> &Arc<dyn BytesToBytesCodecTraits> {
        match self {
            Self::Filter(codec) | Self::Compressor(codec) => codec,
        }
    }
}

/// Codec traits.
pub trait CodecTraits: Send + Sync + core::fmt::Debug {
    /// Returns the `numcodecs` id of the codec.
    fn identifier(&self) -> &'static str;

    /// Create metadata.
    fn create_metadata(&self) -> MetadataV2;
}

/// Traits for bytes to bytes codecs.
pub trait BytesToBytesCodecTraits: CodecTraits {
    /// Encode bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails or `decoded_value` is incompatible with the codec configuration.
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails or `encoded_value` is incompatible with the codec configuration.
    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError>;
}

/// Encode a chunk with `filters` applied in order and then `compressor`.
///
/// If there are no filters and no compressor the chunk is returned unchanged.
///
/// # Errors
/// Returns a [`CodecError`] if a codec cannot be created from its metadata or fails to encode.
pub fn encode_chunk(
    decoded_value: Vec<u8>,
    filters: &[MetadataV2],
    compressor: Option<&MetadataV2>,
) -> Result<Vec<u8>, CodecError> {
    CodecChain::from_metadata(filters, compressor)?.encode(decoded_value)
}

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// A codec could not be created from its metadata.
    #[error(transparent)]
    CreateError(#[from] PluginCreateError),
    /// The length of the input is not a multiple of the element size.
    #[error("input of {len} bytes is not a multiple of the element size {element_size}")]
    UnexpectedLength {
        /// The input length.
        len: usize,
        /// The element size.
        element_size: usize,
    },
    /// Unsupported data type
    #[error("Unsupported data type {0} for codec {1}")]
    UnsupportedDataType(DataType, String),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for CodecError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
