use crate::{
    array::{ArrayShape, ChunkShape, DataType, Endianness, FillValue, Variable},
    metadata::{
        ArrayMetadataV2, Attributes, ConsolidatedMetadataV2, FillValueMetadataV2,
        GroupMetadataV2, MetadataV2,
    },
};

use super::{Dataset, DATASET_ID_ATTR_KEY};

/// The `.zgroup` key.
pub const GROUP_METADATA_KEY: &str = ".zgroup";

/// The `.zattrs` key.
pub const ATTRIBUTES_KEY: &str = ".zattrs";

/// The `.zarray` key.
pub const ARRAY_METADATA_KEY: &str = ".zarray";

/// The `.zmetadata` key.
pub const CONSOLIDATED_METADATA_KEY: &str = ".zmetadata";

/// The variable attribute holding its dimension names.
pub const ARRAY_DIMENSIONS_ATTR_KEY: &str = "_ARRAY_DIMENSIONS";

/// The raw metadata of a [`Variable`].
///
/// Holds the typed properties needed to locate and encode chunks.
/// The Zarr V2 documents are produced on demand with [`array_metadata`](VariableMetadata::array_metadata) and [`attributes`](VariableMetadata::attributes).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMetadata {
    name: String,
    shape: ArrayShape,
    chunk_shape: ChunkShape,
    data_type: DataType,
    endianness: Endianness,
    fill_value: Option<FillValue>,
    compressor: Option<MetadataV2>,
    filters: Vec<MetadataV2>,
    dimension_names: Vec<String>,
    attributes: Attributes,
}

impl VariableMetadata {
    fn derive(variable: &Variable) -> Self {
        Self {
            name: variable.name().to_string(),
            shape: variable.shape().to_vec(),
            chunk_shape: variable.chunk_shape().clone(),
            data_type: variable.data_type(),
            endianness: variable.endianness(),
            fill_value: variable.fill_value().copied(),
            compressor: variable.compressor().cloned(),
            filters: variable.filters().to_vec(),
            dimension_names: variable.dimension_names().to_vec(),
            attributes: variable.attributes().clone(),
        }
    }

    /// Return the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the chunk shape.
    #[must_use]
    pub const fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// Return the data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Return the endianness of the elements.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Return the fill value, if any.
    #[must_use]
    pub const fn fill_value(&self) -> Option<&FillValue> {
        self.fill_value.as_ref()
    }

    /// Return the compressor.
    #[must_use]
    pub const fn compressor(&self) -> Option<&MetadataV2> {
        self.compressor.as_ref()
    }

    /// Return the filters.
    #[must_use]
    pub fn filters(&self) -> &[MetadataV2] {
        &self.filters
    }

    /// Return the dimension names.
    #[must_use]
    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    /// Create the `.zarray` document.
    #[must_use]
    pub fn array_metadata(&self) -> ArrayMetadataV2 {
        ArrayMetadataV2::new(
            self.shape.clone(),
            self.chunk_shape.clone(),
            self.data_type.to_dtype_v2(self.endianness),
            self.fill_value
                .as_ref()
                .map_or(FillValueMetadataV2::Null, FillValue::to_metadata),
            self.compressor.clone(),
            Some(self.filters.clone()),
        )
    }

    /// Create the `.zattrs` document.
    ///
    /// The variable attributes with [`ARRAY_DIMENSIONS_ATTR_KEY`] set to the dimension names.
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        let mut attributes = strip_identity(&self.attributes);
        attributes.insert(
            ARRAY_DIMENSIONS_ATTR_KEY.to_string(),
            self.dimension_names.clone().into(),
        );
        attributes
    }
}

fn strip_identity(attributes: &Attributes) -> Attributes {
    let mut attributes = attributes.clone();
    attributes.remove(DATASET_ID_ATTR_KEY);
    attributes
}

/// The metadata of a [`Dataset`].
///
/// [`derive`](DatasetMetadata::derive) captures the raw metadata of every variable.
/// [`jsonify`](DatasetMetadata::jsonify) produces the consolidated Zarr V2 metadata served to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    identity: String,
    attributes: Attributes,
    variables: Vec<VariableMetadata>,
}

impl DatasetMetadata {
    /// Derive the metadata of `dataset`.
    #[must_use]
    pub fn derive(dataset: &Dataset) -> Self {
        Self {
            identity: dataset.identity().to_string(),
            attributes: dataset.attributes().clone(),
            variables: dataset
                .variables()
                .iter()
                .map(VariableMetadata::derive)
                .collect(),
        }
    }

    /// Return the identity of the dataset.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Return the metadata of each variable.
    #[must_use]
    pub fn variables(&self) -> &[VariableMetadata] {
        &self.variables
    }

    /// Return the metadata of the variable named `name`, if it exists.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableMetadata> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// Create the `.zgroup` document.
    #[must_use]
    pub fn group_metadata(&self) -> GroupMetadataV2 {
        GroupMetadataV2::new()
    }

    /// Create the group `.zattrs` document.
    #[must_use]
    pub fn group_attributes(&self) -> Attributes {
        strip_identity(&self.attributes)
    }

    /// Create the consolidated metadata (`.zmetadata`) document.
    ///
    /// Documents are keyed `.zgroup`, `.zattrs`, then `{name}/.zarray` and `{name}/.zattrs` for each variable in order.
    ///
    /// # Errors
    /// Returns a [`serde_json::Error`] if a document cannot be converted to JSON.
    pub fn jsonify(&self) -> Result<ConsolidatedMetadataV2, serde_json::Error> {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            GROUP_METADATA_KEY.to_string(),
            serde_json::to_value(self.group_metadata())?,
        );
        metadata.insert(
            ATTRIBUTES_KEY.to_string(),
            serde_json::Value::Object(self.group_attributes()),
        );
        for variable in &self.variables {
            metadata.insert(
                format!("{}/{ARRAY_METADATA_KEY}", variable.name),
                serde_json::to_value(variable.array_metadata())?,
            );
            metadata.insert(
                format!("{}/{ATTRIBUTES_KEY}", variable.name),
                serde_json::Value::Object(variable.attributes()),
            );
        }
        Ok(ConsolidatedMetadataV2::new(metadata))
    }
}
