//! The `gzip` compressor.
//!
//! Compresses a chunk to a gzip member, as `numcodecs.GZip` does.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "gzip",
//!     "level": 5
//! }
//! ```

mod gzip_codec;
mod gzip_configuration;

pub use gzip_codec::GzipCodec;
pub use gzip_configuration::{GzipCodecConfiguration, GzipCodecConfigurationV1};

use crate::{
    array::codec::{Codec, CodecPlugin},
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

/// The identifier for the `gzip` compressor.
pub const IDENTIFIER: &str = "gzip";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_gzip, create_codec_gzip)
}

fn is_name_gzip(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_gzip(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: GzipCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = GzipCodec::new_with_configuration(&configuration);
    Ok(Codec::Compressor(std::sync::Arc::new(codec)))
}
