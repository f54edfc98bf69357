//! The `zstd` compressor.
//!
//! Compresses a chunk to a Zstandard frame, as `numcodecs.Zstd` does.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "zstd",
//!     "level": 5,
//!     "checksum": false
//! }
//! ```
//! `checksum` is optional and defaults to false.

mod zstd_codec;
mod zstd_configuration;

pub use zstd_codec::ZstdCodec;
pub use zstd_configuration::{
    ZstdCodecConfiguration, ZstdCodecConfigurationV1, ZstdCompressionLevel,
};

use crate::{
    array::codec::{Codec, CodecPlugin},
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

/// The identifier for the `zstd` compressor.
pub const IDENTIFIER: &str = "zstd";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_zstd, create_codec_zstd)
}

fn is_name_zstd(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_zstd(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: ZstdCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = ZstdCodec::new_with_configuration(&configuration);
    Ok(Codec::Compressor(std::sync::Arc::new(codec)))
}

#[cfg(test)]
mod tests {
    use crate::array::codec::BytesToBytesCodecTraits;

    use super::*;

    const JSON_VALID: &str = r#"{
    "level": 22,
    "checksum": false
}"#;

    #[test]
    fn codec_zstd_round_trip1() {
        let elements: Vec<u16> = (0..32).collect();
        let bytes: Vec<u8> = bytemuck::cast_slice(&elements).to_vec();

        let configuration: ZstdCodecConfiguration = serde_json::from_str(JSON_VALID).unwrap();
        let codec = ZstdCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone()).unwrap();
        assert_eq!(&encoded[..4], &[0x28, 0xb5, 0x2f, 0xfd]);
        let decoded = codec.decode(encoded).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_zstd_checksum() {
        let bytes: Vec<u8> = (0..=255).collect();
        let codec = ZstdCodec::new(3, true);
        let with_checksum = codec.encode(bytes.clone()).unwrap();
        let without_checksum = ZstdCodec::new(3, false).encode(bytes.clone()).unwrap();
        assert_eq!(with_checksum.len(), without_checksum.len() + 4);
        assert_eq!(codec.decode(with_checksum).unwrap(), bytes);
    }

    #[test]
    fn codec_zstd_metadata() {
        let metadata: MetadataV2 = serde_json::from_str(r#"{"id":"zstd","level":1}"#).unwrap();
        let codec = create_codec_zstd(&metadata).unwrap();
        assert_eq!(
            codec.as_bytes_to_bytes().create_metadata().to_string(),
            r#"{"id":"zstd","level":1,"checksum":false}"#
        );

        let metadata: MetadataV2 = serde_json::from_str(r#"{"id":"zstd","level":23}"#).unwrap();
        assert!(create_codec_zstd(&metadata).is_err());
    }
}
