/// Zarr V2 array metadata.
pub mod array;

/// Zarr V2 group metadata.
pub mod group;

/// Zarr V2 consolidated metadata.
pub mod consolidated;

mod fill_value;
mod metadata;

pub use array::{ArrayMetadataV2, ArrayMetadataV2Order, DimensionSeparatorV2};
pub use consolidated::ConsolidatedMetadataV2;
pub use fill_value::FillValueMetadataV2;
pub use group::GroupMetadataV2;
pub use metadata::MetadataV2;
