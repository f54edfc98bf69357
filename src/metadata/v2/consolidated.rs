use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Zarr V2 consolidated metadata (`.zmetadata`).
///
/// All group and array documents keyed by their store path, so a client can open a hierarchy in one round trip:
/// ```json
/// {
///     "metadata": {
///         ".zgroup": {"zarr_format": 2},
///         ".zattrs": {},
///         "air/.zarray": {...},
///         "air/.zattrs": {"_ARRAY_DIMENSIONS": ["lat", "lon"]}
///     },
///     "zarr_consolidated_format": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ConsolidatedMetadataV2 {
    /// The metadata documents keyed by path, in insertion order.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// The consolidated metadata format version. Must be `1`.
    pub zarr_consolidated_format: monostate::MustBe!(1u64),
}

impl ConsolidatedMetadataV2 {
    /// Create new consolidated metadata from a map of path to document.
    #[must_use]
    pub fn new(metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            metadata,
            zarr_consolidated_format: monostate::MustBe!(1u64),
        }
    }
}
