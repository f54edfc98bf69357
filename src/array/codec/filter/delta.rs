//! The `delta` filter.
//!
//! Encodes each element as the difference from the previous element, as `numcodecs.Delta` does.
//! The first element is stored unchanged and integer differences wrap on overflow.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "delta",
//!     "dtype": "<i4",
//!     "astype": "<i4"
//! }
//! ```
//!
//! `astype` is optional, and if present must equal `dtype`.

use std::sync::Arc;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    array::{
        codec::{
            numeric::{dispatch_numeric, is_numeric, read_elements, write_elements, NumericElement},
            BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits,
        },
        DataType, Endianness,
    },
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::parse_filter_dtype;

/// The identifier for the `delta` filter.
pub const IDENTIFIER: &str = "delta";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_delta, create_codec_delta)
}

fn is_name_delta(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_delta(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration: DeltaCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = DeltaCodec::new_with_configuration(&configuration)?;
    Ok(Codec::Filter(Arc::new(codec)))
}

/// A wrapper to handle various versions of `delta` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display, From)]
#[serde(untagged)]
pub enum DeltaCodecConfiguration {
    /// Version 1.0.
    V1(DeltaCodecConfigurationV1),
}

/// `delta` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct DeltaCodecConfigurationV1 {
    /// The data type of the elements.
    pub dtype: String,
    /// The data type of the encoded elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astype: Option<String>,
}

/// A `delta` codec implementation.
#[derive(Clone, Debug)]
pub struct DeltaCodec {
    data_type: DataType,
    endianness: Endianness,
    configuration: DeltaCodecConfigurationV1,
}

impl DeltaCodec {
    /// Create a new `delta` codec for elements of `dtype`, a Zarr V2 data type string.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if `dtype` is not an integer or floating point data type supported by the codec.
    pub fn new(dtype: &str) -> Result<Self, PluginCreateError> {
        Self::new_with_configuration(&DeltaCodecConfiguration::V1(DeltaCodecConfigurationV1 {
            dtype: dtype.to_string(),
            astype: None,
        }))
    }

    /// Create a new `delta` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn new_with_configuration(
        configuration: &DeltaCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        let DeltaCodecConfiguration::V1(configuration) = configuration;
        let (data_type, endianness) =
            parse_filter_dtype(&configuration.dtype).map_err(|err| err.to_string())?;
        if let Some(astype) = &configuration.astype {
            if parse_filter_dtype(astype).map_err(|err| err.to_string())? != (data_type, endianness)
            {
                return Err(PluginCreateError::from(format!(
                    "the delta codec astype {astype} must match dtype {}",
                    configuration.dtype
                )));
            }
        }
        if !is_numeric(data_type) {
            return Err(PluginCreateError::from(format!(
                "the delta codec does not support the {data_type} data type"
            )));
        }
        Ok(Self {
            data_type,
            endianness,
            configuration: configuration.clone(),
        })
    }
}

fn delta_encode<T: NumericElement>(
    bytes: &[u8],
    endianness: Endianness,
) -> Result<Vec<u8>, CodecError> {
    let elements = read_elements::<T>(bytes, endianness)?;
    let mut previous = T::default();
    let encoded: Vec<T> = elements
        .into_iter()
        .map(|element| {
            let difference = element.delta_sub(previous);
            previous = element;
            difference
        })
        .collect();
    Ok(write_elements(&encoded, endianness))
}

fn delta_decode<T: NumericElement>(
    bytes: &[u8],
    endianness: Endianness,
) -> Result<Vec<u8>, CodecError> {
    let elements = read_elements::<T>(bytes, endianness)?;
    let decoded: Vec<T> = elements
        .into_iter()
        .scan(T::default(), |sum, difference| {
            *sum = sum.delta_add(difference);
            Some(*sum)
        })
        .collect();
    Ok(write_elements(&decoded, endianness))
}

impl CodecTraits for DeltaCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &self.configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for DeltaCodec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        dispatch_numeric!(
            self.data_type,
            IDENTIFIER,
            delta_encode(&decoded_value, self.endianness)
        )
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        dispatch_numeric!(
            self.data_type,
            IDENTIFIER,
            delta_decode(&encoded_value, self.endianness)
        )
    }
}
