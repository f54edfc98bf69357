use std::sync::Arc;

use crate::{metadata::MetadataV2, plugin::PluginCreateError};

use super::{BytesToBytesCodecTraits, Codec, CodecError};

/// An ordered list of filters followed by an optional compressor.
#[derive(Debug, Clone, Default)]
pub struct CodecChain {
    filters: Vec<Arc<dyn BytesToBytesCodecTraits>>,
    compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
}

impl CodecChain {
    /// Create a new codec chain.
    #[must_use]
    pub fn new(
        filters: Vec<Arc<dyn BytesToBytesCodecTraits>>,
        compressor: Option<Arc<dyn BytesToBytesCodecTraits>>,
    ) -> Self {
        Self {
            filters,
            compressor,
        }
    }

    /// Create a new codec chain from filter and compressor metadata.
    ///
    /// Any registered codec may be used as a filter, but only a compressor can occupy the compressor slot.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if:
    ///  - a codec is not registered or has an invalid configuration, or
    ///  - `compressor` identifies a filter.
    pub fn from_metadata(
        filters: &[MetadataV2],
        compressor: Option<&MetadataV2>,
    ) -> Result<Self, PluginCreateError> {
        let filters = filters
            .iter()
            .map(|metadata| Ok(Codec::from_metadata(metadata)?.as_bytes_to_bytes().clone()))
            .collect::<Result<Vec<_>, PluginCreateError>>()?;
        let compressor = match compressor.map(Codec::from_metadata).transpose()? {
            Some(Codec::Compressor(compressor)) => Some(compressor),
            Some(Codec::Filter(filter)) => {
                return Err(PluginCreateError::from(format!(
                    "{} is a filter and cannot be used as a compressor",
                    filter.identifier()
                )))
            }
            None => None,
        };
        Ok(Self::new(filters, compressor))
    }

    /// Returns the filters.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn BytesToBytesCodecTraits>] {
        &self.filters
    }

    /// Returns the compressor.
    #[must_use]
    pub fn compressor(&self) -> Option<&Arc<dyn BytesToBytesCodecTraits>> {
        self.compressor.as_ref()
    }

    /// Create the filter and compressor metadata of the chain.
    #[must_use]
    pub fn create_metadata(&self) -> (Vec<MetadataV2>, Option<MetadataV2>) {
        (
            self.filters
                .iter()
                .map(|filter| filter.create_metadata())
                .collect(),
            self.compressor
                .as_ref()
                .map(|compressor| compressor.create_metadata()),
        )
    }

    /// Encode bytes by applying each filter in order and then the compressor.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if a codec fails.
    pub fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut value = decoded_value;
        for codec in self.filters.iter().chain(&self.compressor) {
            value = codec.encode(value)?;
        }
        Ok(value)
    }

    /// Decode bytes by applying the compressor and then each filter in reverse order.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if a codec fails.
    pub fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut value = encoded_value;
        for codec in self.compressor.iter().chain(self.filters.iter().rev()) {
            value = codec.decode(value)?;
        }
        Ok(value)
    }
}
