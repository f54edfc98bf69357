use crate::dataset::{ARRAY_METADATA_KEY, ATTRIBUTES_KEY, GROUP_METADATA_KEY};

/// The kind of document requested under a variable.
///
/// A request `/{var}/{key}` is classified by exact match of `key`, so a chunk key can never be mistaken for a metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZarrKey<'a> {
    /// `.zarray`: the array metadata.
    ArrayMeta,
    /// `.zattrs`: the array attributes.
    Attrs,
    /// `.zgroup`: group metadata, which does not exist below the root of a dataset.
    GroupMeta,
    /// Any other key is a chunk key, e.g. `0.1`.
    ChunkCoord(&'a str),
}

impl<'a> ZarrKey<'a> {
    /// Classify `key`.
    #[must_use]
    pub fn classify(key: &'a str) -> Self {
        match key {
            ARRAY_METADATA_KEY => Self::ArrayMeta,
            ATTRIBUTES_KEY => Self::Attrs,
            GROUP_METADATA_KEY => Self::GroupMeta,
            chunk_key => Self::ChunkCoord(chunk_key),
        }
    }
}
