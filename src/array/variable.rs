use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::{
    array_subset::ArraySubset,
    metadata::{Attributes, MetadataV2},
    plugin::PluginCreateError,
};

use super::{
    ArrayData, ArrayDataError, ArrayIndices, ArrayShape, ChunkKeyError, ChunkShape, CodecChain,
    DataType, Element, Endianness, FillValue, IncompatibleElementTypeError,
    IncompatibleFillValueError, InMemoryArrayData, RegularChunkGrid, NATIVE_ENDIAN,
};

/// A variable creation error.
#[derive(Debug, Error)]
pub enum VariableCreateError {
    /// An invalid variable name.
    #[error("invalid variable name {_0:?}")]
    InvalidName(String),
    /// The chunk shape is incompatible with the array shape.
    #[error("chunk shape {chunks:?} is invalid for array shape {shape:?}")]
    InvalidChunkShape {
        /// The chunk shape.
        chunks: ArrayShape,
        /// The array shape.
        shape: ArrayShape,
    },
    /// The number of dimension names does not match the array dimensionality.
    #[error("the number of dimension names {0} does not match array dimensionality {1}")]
    InvalidDimensionNames(usize, usize),
    /// The shape of the array data does not match the variable shape.
    #[error("array data has shape {got:?}, expected {expected:?}")]
    DataShapeMismatch {
        /// The variable shape.
        expected: ArrayShape,
        /// The array data shape.
        got: ArrayShape,
    },
    /// The element size of the array data does not match the data type.
    #[error("array data has element size {got}, expected {expected}")]
    ElementSizeMismatch {
        /// The size of the data type.
        expected: usize,
        /// The array data element size.
        got: usize,
    },
    /// The fill value is incompatible with the data type.
    #[error(transparent)]
    IncompatibleFillValue(#[from] IncompatibleFillValueError),
    /// The element type is incompatible with the data type.
    #[error(transparent)]
    IncompatibleElementType(#[from] IncompatibleElementTypeError),
    /// The array data is invalid.
    #[error(transparent)]
    ArrayDataError(#[from] ArrayDataError),
    /// A filter or the compressor is unsupported or has an invalid configuration.
    #[error(transparent)]
    CodecsCreateError(#[from] PluginCreateError),
}

/// A named multidimensional array of a [`Dataset`](crate::dataset::Dataset).
///
/// A variable pairs [`ArrayData`] with the Zarr V2 array properties it is served with.
/// The elements of the array data are C order and native endian, so the data type of a variable is advertised with the native byte order.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    data: Arc<dyn ArrayData>,
    data_type: DataType,
    chunk_grid: RegularChunkGrid,
    dimension_names: Vec<String>,
    fill_value: Option<FillValue>,
    compressor: Option<MetadataV2>,
    filters: Vec<MetadataV2>,
    attributes: Attributes,
}

impl Variable {
    /// Return the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        self.data.shape()
    }

    /// Return the dimensionality.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.shape().len()
    }

    /// Return the data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Return the endianness of the elements.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        NATIVE_ENDIAN
    }

    /// Return the chunk grid.
    #[must_use]
    pub const fn chunk_grid(&self) -> &RegularChunkGrid {
        &self.chunk_grid
    }

    /// Return the chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &ChunkShape {
        self.chunk_grid.chunk_shape()
    }

    /// Return the dimension names.
    #[must_use]
    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    /// Return the fill value, [`None`] if the fill value is `null`.
    #[must_use]
    pub const fn fill_value(&self) -> Option<&FillValue> {
        self.fill_value.as_ref()
    }

    /// Return the compressor metadata.
    #[must_use]
    pub const fn compressor(&self) -> Option<&MetadataV2> {
        self.compressor.as_ref()
    }

    /// Return the filter metadata.
    #[must_use]
    pub fn filters(&self) -> &[MetadataV2] {
        &self.filters
    }

    /// Return the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Return the array data.
    #[must_use]
    pub fn data(&self) -> &Arc<dyn ArrayData> {
        &self.data
    }

    /// Locate the chunk with key `chunk_key`, returning its chunk grid indices and the array subset it covers.
    ///
    /// # Errors
    /// Returns a [`ChunkKeyError`] if the chunk key is malformed, has the wrong number of components, or is outside of the chunk grid.
    pub fn locate_chunk(&self, chunk_key: &str) -> Result<(ArrayIndices, ArraySubset), ChunkKeyError> {
        self.chunk_grid.locate(chunk_key, self.shape())
    }

    /// Read the elements of `subset` as C order native endian bytes.
    ///
    /// # Errors
    /// Returns an [`ArrayDataError`] if the subset is out of bounds or the array data cannot be read.
    pub fn read_subset(&self, subset: &ArraySubset) -> Result<Vec<u8>, ArrayDataError> {
        self.data.read_subset(subset)
    }
}

/// A [`Variable`] builder.
///
/// The variable builder is initialised from a name, array shape, and data type.
///  - The chunk shape defaults to the array shape, so the variable has a single chunk.
///  - The fill value defaults to the [default fill value](DataType::default_fill_value) of the data type.
///  - There is no compressor and there are no filters, so chunks are served uncompressed.
///  - Dimension names default to `dim_0`, `dim_1`, ... and attributes are empty.
///
/// The variable is built with array data using [`build`](VariableBuilder::build), [`build_from_elements`](VariableBuilder::build_from_elements), [`build_from_bytes`](VariableBuilder::build_from_bytes) or [`build_from_ndarray`](VariableBuilder::build_from_ndarray).
///
/// For example:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use zarrs_serve::{array::{DataType, FillValue, VariableBuilder}, metadata::MetadataV2};
/// let elements: Vec<i32> = (0..64).collect();
/// let variable = VariableBuilder::new("temperature", vec![8, 8], DataType::Int32)
///     .chunks(vec![4, 4])
///     .fill_value(FillValue::Int(-9999))
///     .filters(vec![serde_json::from_str::<MetadataV2>(r#"{"id": "delta", "dtype": "<i4"}"#)?])
///     .dimension_names(["y", "x"])
///     .build_from_elements(&elements)?;
/// assert_eq!(variable.chunk_grid().grid_shape(variable.shape()), vec![2, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VariableBuilder {
    /// Variable name.
    pub name: String,
    /// Array shape.
    pub shape: ArrayShape,
    /// Data type.
    pub data_type: DataType,
    /// Chunk shape, the array shape if [`None`].
    pub chunks: Option<ArrayShape>,
    /// Dimension names, `dim_0`, `dim_1`, ... if [`None`].
    pub dimension_names: Option<Vec<String>>,
    /// Fill value, `null` if [`None`].
    pub fill_value: Option<FillValue>,
    /// Compressor.
    pub compressor: Option<MetadataV2>,
    /// Filters.
    pub filters: Vec<MetadataV2>,
    /// Attributes.
    pub attributes: Attributes,
}

impl VariableBuilder {
    /// Create a new variable builder.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: ArrayShape, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            shape,
            data_type,
            chunks: None,
            dimension_names: None,
            fill_value: Some(data_type.default_fill_value()),
            compressor: None,
            filters: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    /// Set the chunk shape.
    ///
    /// Each chunk dimension must be non-zero and no larger than the array dimension (or 1 if the array dimension is zero).
    pub fn chunks(&mut self, chunks: ArrayShape) -> &mut Self {
        self.chunks = Some(chunks);
        self
    }

    /// Set the dimension names.
    pub fn dimension_names<I, D>(&mut self, dimension_names: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.dimension_names = Some(dimension_names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the fill value.
    pub fn fill_value(&mut self, fill_value: impl Into<FillValue>) -> &mut Self {
        self.fill_value = Some(fill_value.into());
        self
    }

    /// Remove the fill value, so that it is advertised as `null`.
    pub fn no_fill_value(&mut self) -> &mut Self {
        self.fill_value = None;
        self
    }

    /// Set the compressor.
    pub fn compressor(&mut self, compressor: Option<MetadataV2>) -> &mut Self {
        self.compressor = compressor;
        self
    }

    /// Set the filters, applied in order before the compressor.
    pub fn filters(&mut self, filters: Vec<MetadataV2>) -> &mut Self {
        self.filters = filters;
        self
    }

    /// Set the user defined attributes.
    pub fn attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    fn validate_chunks(&self) -> Result<ChunkShape, VariableCreateError> {
        let chunks = self
            .chunks
            .clone()
            .unwrap_or_else(|| self.shape.iter().map(|&s| s.max(1)).collect());
        let err = || VariableCreateError::InvalidChunkShape {
            chunks: chunks.clone(),
            shape: self.shape.clone(),
        };
        if chunks.len() != self.shape.len()
            || std::iter::zip(&chunks, &self.shape).any(|(&c, &s)| c > s.max(1))
        {
            return Err(err());
        }
        ChunkShape::try_from(chunks.as_slice()).map_err(|_| err())
    }

    /// Build into a [`Variable`] backed by `data`.
    ///
    /// # Errors
    /// Returns a [`VariableCreateError`] if:
    ///  - the name is empty, contains `/`, or starts with `.`,
    ///  - the chunk shape or dimension names are incompatible with the array shape,
    ///  - the shape or element size of `data` does not match the variable,
    ///  - the fill value is incompatible with the data type, or
    ///  - a filter or the compressor is unsupported or has an invalid configuration.
    pub fn build(&self, data: Arc<dyn ArrayData>) -> Result<Variable, VariableCreateError> {
        if self.name.is_empty() || self.name.contains('/') || self.name.starts_with('.') {
            return Err(VariableCreateError::InvalidName(self.name.clone()));
        }
        let chunk_shape = self.validate_chunks()?;
        let dimension_names = match &self.dimension_names {
            Some(dimension_names) if dimension_names.len() != self.shape.len() => {
                return Err(VariableCreateError::InvalidDimensionNames(
                    dimension_names.len(),
                    self.shape.len(),
                ));
            }
            Some(dimension_names) => dimension_names.clone(),
            None => (0..self.shape.len()).map(|i| format!("dim_{i}")).collect(),
        };
        if data.shape() != self.shape.as_slice() {
            return Err(VariableCreateError::DataShapeMismatch {
                expected: self.shape.clone(),
                got: data.shape().to_vec(),
            });
        }
        if data.element_size() != self.data_type.size() {
            return Err(VariableCreateError::ElementSizeMismatch {
                expected: self.data_type.size(),
                got: data.element_size(),
            });
        }
        if let Some(fill_value) = self.fill_value {
            if !fill_value.is_compatible(self.data_type) {
                return Err(IncompatibleFillValueError::new(fill_value, self.data_type).into());
            }
        }
        let (filters, compressor) =
            CodecChain::from_metadata(&self.filters, self.compressor.as_ref())?.create_metadata();

        Ok(Variable {
            name: self.name.clone(),
            data,
            data_type: self.data_type,
            chunk_grid: RegularChunkGrid::new(chunk_shape),
            dimension_names,
            fill_value: self.fill_value,
            compressor,
            filters,
            attributes: self.attributes.clone(),
        })
    }

    /// Build into a [`Variable`] holding a copy of C order `elements`.
    ///
    /// # Errors
    /// Returns a [`VariableCreateError`] if the element type is incompatible with the data type, the number of elements does not match the shape, or [`build`](VariableBuilder::build) fails.
    pub fn build_from_elements<T: Element>(
        &self,
        elements: &[T],
    ) -> Result<Variable, VariableCreateError> {
        T::validate_data_type(self.data_type)?;
        let data = InMemoryArrayData::from_elements(self.shape.clone(), elements)?;
        self.build(Arc::new(data))
    }

    /// Build into a [`Variable`] holding C order native endian `bytes`.
    ///
    /// # Errors
    /// Returns a [`VariableCreateError`] if the length of `bytes` does not match the shape and data type, or [`build`](VariableBuilder::build) fails.
    pub fn build_from_bytes(
        &self,
        bytes: impl Into<Bytes>,
    ) -> Result<Variable, VariableCreateError> {
        let data = InMemoryArrayData::new(self.shape.clone(), self.data_type.size(), bytes)?;
        self.build(Arc::new(data))
    }

    #[cfg(feature = "ndarray")]
    /// Build into a [`Variable`] holding a copy of an [`ndarray::ArrayBase`].
    ///
    /// # Errors
    /// Returns a [`VariableCreateError`] if the element type is incompatible with the data type, the shape of `array` does not match the shape, or [`build`](VariableBuilder::build) fails.
    pub fn build_from_ndarray<T: Element, S: ndarray::Data<Elem = T>, D: ndarray::Dimension>(
        &self,
        array: &ndarray::ArrayBase<S, D>,
    ) -> Result<Variable, VariableCreateError> {
        T::validate_data_type(self.data_type)?;
        self.build(Arc::new(InMemoryArrayData::from_ndarray(array)))
    }
}
