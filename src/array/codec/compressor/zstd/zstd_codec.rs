use std::io::{Cursor, Write};

use zstd::zstd_safe;

use crate::{
    array::codec::{BytesToBytesCodecTraits, CodecError, CodecTraits},
    metadata::MetadataV2,
};

use super::{ZstdCodecConfiguration, ZstdCodecConfigurationV1, IDENTIFIER};

/// A `zstd` codec implementation.
#[derive(Clone, Debug)]
pub struct ZstdCodec {
    compression: zstd_safe::CompressionLevel,
    checksum: bool,
}

impl ZstdCodec {
    /// Create a new `zstd` codec.
    #[must_use]
    pub const fn new(compression: zstd_safe::CompressionLevel, checksum: bool) -> Self {
        Self {
            compression,
            checksum,
        }
    }

    /// Create a new `zstd` codec from configuration.
    #[must_use]
    pub fn new_with_configuration(configuration: &ZstdCodecConfiguration) -> Self {
        let ZstdCodecConfiguration::V1(configuration) = configuration;
        Self {
            compression: configuration.level.into(),
            checksum: configuration.checksum,
        }
    }
}

impl CodecTraits for ZstdCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        let configuration = ZstdCodecConfigurationV1::new(self.compression.into(), self.checksum);
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for ZstdCodec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut encoder = zstd::Encoder::new(Vec::new(), self.compression)?;
        encoder.include_checksum(self.checksum)?;
        encoder.write_all(&decoded_value)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        zstd::decode_all(Cursor::new(encoded_value)).map_err(CodecError::IOError)
    }
}
