//! Zarr V2 arrays.
//!
//! A [`Variable`] is a named multidimensional array with a [`DataType`], a regular chunk grid, a fill value, a filter and compressor [codec chain](codec), attributes and dimension names.
//! The elements of a variable are held by an [`ArrayData`] backing store, which may be in memory ([`InMemoryArrayData`]) or computed on demand ([`ComputedArrayData`]).
//!
//! Use [`VariableBuilder`] to create a variable.

pub mod chunk_grid;
pub mod codec;

mod array_data;
mod chunk_shape;
mod data_type;
mod element;
mod endianness;
mod fill_value;
mod variable;

pub use self::{
    array_data::{ArrayData, ArrayDataError, ComputedArrayData, InMemoryArrayData},
    chunk_grid::{ChunkKeyError, RegularChunkGrid},
    chunk_shape::{chunk_shape_to_array_shape, ChunkShape},
    codec::CodecChain,
    data_type::{DataType, TimeUnit, UnsupportedDataTypeError},
    element::{Element, IncompatibleElementTypeError},
    endianness::{Endianness, NATIVE_ENDIAN},
    fill_value::{FillValue, IncompatibleFillValueError},
    variable::{Variable, VariableBuilder, VariableCreateError},
};

use thiserror::Error;

/// An ND index to an element in an array.
pub type ArrayIndices = Vec<u64>;

/// The shape of an array.
pub type ArrayShape = Vec<u64>;

/// A zero value where a non-zero value was expected.
#[derive(Copy, Clone, Debug, Error)]
#[error("value must be non-zero")]
pub struct NonZeroError;

/// Ravel ND indices to a linearised index.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> u64 {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        index += i * count;
        count *= s;
    }
    index
}
