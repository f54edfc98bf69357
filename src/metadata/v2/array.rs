use derive_more::Display;
use serde::{Deserialize, Serialize, Serializer};

use crate::array::{ArrayShape, ChunkShape};

use super::{FillValueMetadataV2, MetadataV2};

/// Zarr V2 array metadata (`.zarray`).
///
/// Fields serialise in lexicographic order, matching the documents written by other Zarr V2 implementations.
/// An example `JSON` document:
/// ```json
/// {
///     "chunks": [5, 5],
///     "compressor": {"id": "zlib", "level": 1},
///     "dimension_separator": ".",
///     "dtype": "<f8",
///     "fill_value": "NaN",
///     "filters": null,
///     "order": "C",
///     "shape": [10, 10],
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// A list of integers defining the length of each dimension of a chunk of the array.
    pub chunks: ChunkShape,
    /// A JSON object identifying the primary compression codec and providing configuration parameters, or null if no compressor is to be used.
    pub compressor: Option<MetadataV2>,
    /// Either "." or "/", defining the separator placed between the dimensions of a chunk key.
    #[serde(default)]
    pub dimension_separator: DimensionSeparatorV2,
    /// The data type of the array, e.g. `<f8`.
    pub dtype: String,
    /// A scalar value providing the default value to use for uninitialized portions of the array, or null if no fill value is to be used.
    pub fill_value: FillValueMetadataV2,
    /// A list of JSON objects providing codec configurations, or null if no filters are to be applied.
    #[serde(default, serialize_with = "serialize_v2_filters")]
    pub filters: Option<Vec<MetadataV2>>,
    /// Either "C" or "F", defining the layout of bytes within each chunk of the array.
    pub order: ArrayMetadataV2Order,
    /// An array of integers providing the length of each dimension of the array.
    pub shape: ArrayShape,
    /// An integer defining the version of the storage specification to which the array adheres. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
}

#[allow(clippy::ref_option)]
fn serialize_v2_filters<S>(
    filters: &Option<Vec<MetadataV2>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let filters = filters.as_ref().filter(|v| !v.is_empty());
    match filters {
        Some(filters) => serializer.collect_seq(filters),
        None => serializer.serialize_none(),
    }
}

impl ArrayMetadataV2 {
    /// Create Zarr V2 array metadata.
    ///
    /// Defaults to C order and a `.` dimension separator.
    /// An empty filter list is normalised to [`None`].
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ChunkShape,
        dtype: String,
        fill_value: FillValueMetadataV2,
        compressor: Option<MetadataV2>,
        filters: Option<Vec<MetadataV2>>,
    ) -> Self {
        let filters = filters.filter(|v| !v.is_empty());
        Self {
            chunks,
            compressor,
            dimension_separator: DimensionSeparatorV2::Dot,
            dtype,
            fill_value,
            filters,
            order: ArrayMetadataV2Order::C,
            shape,
            zarr_format: monostate::MustBe!(2u64),
        }
    }
}

/// The layout of bytes within each chunk of the array.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}

/// The separator between the dimensions of a Zarr V2 chunk key.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default, Display)]
pub enum DimensionSeparatorV2 {
    /// The `.` separator, e.g. `1.2`.
    #[default]
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
    /// The `/` separator, e.g. `1/2`.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
}

impl DimensionSeparatorV2 {
    /// Return the separator character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Slash => '/',
        }
    }
}
