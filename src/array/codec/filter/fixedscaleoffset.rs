//! The `fixedscaleoffset` filter.
//!
//! Stores values as `round((x - offset) * scale)` converted to `astype`, and decodes `y / scale + offset` converted back to `dtype`.
//! Equivalent to `numcodecs.FixedScaleOffset`, including rounding half to even.
//! This filter is lossy.
//!
//! ### Example metadata
//! ```json
//! {
//!     "id": "fixedscaleoffset",
//!     "offset": 1000,
//!     "scale": 10,
//!     "dtype": "<f8",
//!     "astype": "<u1"
//! }
//! ```
//!
//! `astype` defaults to `dtype`.
//! The byte order character of `dtype` and `astype` may be omitted, in which case it is little endian.

use std::sync::Arc;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    array::{
        codec::{
            numeric::{dispatch_numeric, is_numeric, read_as_f64, write_from_f64},
            BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin, CodecTraits,
        },
        DataType, Endianness,
    },
    metadata::MetadataV2,
    plugin::{PluginCreateError, PluginMetadataInvalidError},
};

use super::parse_filter_dtype;

/// The identifier for the `fixedscaleoffset` filter.
pub const IDENTIFIER: &str = "fixedscaleoffset";

// Register the codec.
inventory::submit! {
    CodecPlugin::new(IDENTIFIER, is_name_fixedscaleoffset, create_codec_fixedscaleoffset)
}

fn is_name_fixedscaleoffset(name: &str) -> bool {
    name.eq(IDENTIFIER)
}

pub(crate) fn create_codec_fixedscaleoffset(
    metadata: &MetadataV2,
) -> Result<Codec, PluginCreateError> {
    let configuration: FixedScaleOffsetCodecConfiguration = metadata
        .to_configuration()
        .map_err(|_| PluginMetadataInvalidError::new(IDENTIFIER, "codec", metadata.clone()))?;
    let codec = FixedScaleOffsetCodec::new_with_configuration(&configuration)?;
    Ok(Codec::Filter(Arc::new(codec)))
}

/// A wrapper to handle various versions of `fixedscaleoffset` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum FixedScaleOffsetCodecConfiguration {
    /// Version 1.0.
    V1(FixedScaleOffsetCodecConfigurationV1),
}

/// `fixedscaleoffset` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct FixedScaleOffsetCodecConfigurationV1 {
    /// Value to subtract from data.
    pub offset: f64,
    /// Value to multiply by data.
    pub scale: f64,
    /// Data type of the decoded elements.
    pub dtype: String,
    /// Data type of the encoded elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astype: Option<String>,
}

/// A `fixedscaleoffset` codec implementation.
#[derive(Clone, Debug)]
pub struct FixedScaleOffsetCodec {
    offset: f64,
    scale: f64,
    dtype: (DataType, Endianness),
    astype: (DataType, Endianness),
    configuration: FixedScaleOffsetCodecConfigurationV1,
}

impl FixedScaleOffsetCodec {
    /// Create a new `fixedscaleoffset` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if a data type is unsupported or `scale` is zero or not finite.
    pub fn new_with_configuration(
        configuration: &FixedScaleOffsetCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        let FixedScaleOffsetCodecConfiguration::V1(configuration) = configuration;
        let dtype = parse_filter_dtype(&configuration.dtype).map_err(|err| err.to_string())?;
        let astype = match &configuration.astype {
            Some(astype) => parse_filter_dtype(astype).map_err(|err| err.to_string())?,
            None => dtype,
        };
        for (data_type, _) in [dtype, astype] {
            if !is_numeric(data_type) {
                return Err(PluginCreateError::from(format!(
                    "the fixedscaleoffset codec does not support the {data_type} data type"
                )));
            }
        }
        if configuration.scale == 0.0
            || !configuration.scale.is_finite()
            || !configuration.offset.is_finite()
        {
            return Err(PluginCreateError::from(
                "the fixedscaleoffset codec requires a finite non-zero scale and a finite offset",
            ));
        }
        Ok(Self {
            offset: configuration.offset,
            scale: configuration.scale,
            dtype,
            astype,
            configuration: configuration.clone(),
        })
    }
}

impl CodecTraits for FixedScaleOffsetCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn create_metadata(&self) -> MetadataV2 {
        MetadataV2::new_with_serializable_configuration(IDENTIFIER, &self.configuration).unwrap()
    }
}

impl BytesToBytesCodecTraits for FixedScaleOffsetCodec {
    fn encode(&self, decoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let (dtype, dtype_endianness) = self.dtype;
        let (astype, astype_endianness) = self.astype;
        let mut values =
            dispatch_numeric!(dtype, IDENTIFIER, read_as_f64(&decoded_value, dtype_endianness))?;
        for value in &mut values {
            *value = ((*value - self.offset) * self.scale).round_ties_even();
        }
        dispatch_numeric!(astype, IDENTIFIER, write_from_f64(&values, astype_endianness))
    }

    fn decode(&self, encoded_value: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let (dtype, dtype_endianness) = self.dtype;
        let (astype, astype_endianness) = self.astype;
        let mut values =
            dispatch_numeric!(astype, IDENTIFIER, read_as_f64(&encoded_value, astype_endianness))?;
        for value in &mut values {
            *value = *value / self.scale + self.offset;
        }
        dispatch_numeric!(dtype, IDENTIFIER, write_from_f64(&values, dtype_endianness))
    }
}
