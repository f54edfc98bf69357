//! Zarr V2 metadata documents.
//!
//! This module provides the serialisable forms of the documents a Zarr V2 client requests:
//!  - [`ArrayMetadataV2`] (`.zarray`),
//!  - [`GroupMetadataV2`] (`.zgroup`),
//!  - [`ConsolidatedMetadataV2`] (`.zmetadata`), and
//!  - [`MetadataV2`], the `{"id": ...}` codec configuration used for compressors and filters.
//!
//! Attributes (`.zattrs`) are a plain JSON object, see [`Attributes`].
//!
//! [`to_ascii_json_vec`] serialises any of these to JSON containing only ASCII bytes.

/// Zarr V2 metadata documents and codec configurations.
pub mod v2;

mod ascii_json;

pub use ascii_json::{to_ascii_json_vec, AsciiFormatter};
pub use v2::{
    ArrayMetadataV2, ArrayMetadataV2Order, ConsolidatedMetadataV2, DimensionSeparatorV2,
    FillValueMetadataV2, GroupMetadataV2, MetadataV2,
};

use derive_more::From;
use thiserror::Error;

/// Configuration metadata.
pub type MetadataConfiguration = serde_json::Map<String, serde_json::Value>;

/// User defined attributes of a group or array.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// An invalid configuration error.
#[derive(Debug, Error, From)]
#[error("{id} is unsupported, configuration: {configuration:?}")]
pub struct ConfigurationInvalidError {
    id: String,
    configuration: MetadataConfiguration,
}

impl ConfigurationInvalidError {
    /// Create a new invalid configuration error.
    #[must_use]
    pub fn new(id: &str, configuration: MetadataConfiguration) -> Self {
        Self {
            id: id.to_string(),
            configuration,
        }
    }

    /// Return the id of the invalid configuration.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the underlying configuration of the invalid configuration.
    #[must_use]
    pub const fn configuration(&self) -> &MetadataConfiguration {
        &self.configuration
    }
}
