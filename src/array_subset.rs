//! Array subsets.
//!
//! An [`ArraySubset`] is a hyper-rectangular region of an array, defined by a start and shape.
//! Chunks are array subsets, and reading a chunk from a variable extracts the bytes of its subset.
//!
//! This module provides convenience functions for:
//!  - iterating over the indices and contiguous runs of elements in an array subset,
//!  - extracting the bytes within a subset of an array, and
//!  - storing bytes into a subset of an array.

mod contiguous_linearised_indices_iterator;
mod indices_iterator;

pub use contiguous_linearised_indices_iterator::ContiguousLinearisedIndicesIterator;
pub use indices_iterator::IndicesIterator;

use derive_more::{Display, From};
use itertools::izip;
use thiserror::Error;

use crate::array::{ArrayIndices, ArrayShape};

/// An array subset.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[display("start {start:?} shape {shape:?}")]
pub struct ArraySubset {
    /// The start of the array subset.
    start: ArrayIndices,
    /// The shape of the array subset.
    shape: ArrayShape,
}

/// An array extract bytes error.
#[derive(Debug, Error)]
#[error("array subset {_0} is incompatible with array of shape {_1:?} and element size {_2}")]
pub struct ArrayExtractBytesError(ArraySubset, ArrayShape, usize);

/// An array store bytes error.
#[derive(Debug, Error)]
pub enum ArrayStoreBytesError {
    /// Invalid array shape.
    #[error("array shape {_1:?} is incompatible with array subset {_0}")]
    InvalidArrayShape(ArraySubset, ArrayShape),
    /// Invalid subset bytes.
    #[error("expected subset bytes to have length {_1}, got {_0}")]
    InvalidSubsetBytes(usize, usize),
    /// Invalid array bytes.
    #[error("expected array bytes to have length {_1}, got {_0}")]
    InvalidArrayBytes(usize, usize),
}

impl ArraySubset {
    /// Create a new array subset with `shape` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: ArrayShape) -> Self {
        Self {
            start: vec![0; shape.len()],
            shape,
        }
    }

    /// Create a new array subset from a list of [`Range`](std::ops::Range)s.
    ///
    /// A range with an end less than its start produces an empty dimension.
    #[must_use]
    pub fn new_with_ranges(ranges: &[std::ops::Range<u64>]) -> Self {
        let start = ranges.iter().map(|range| range.start).collect();
        let shape = ranges
            .iter()
            .map(|range| range.end.saturating_sub(range.start))
            .collect();
        Self { start, shape }
    }

    /// Create a new array subset.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if the size of `start` and `shape` do not match.
    pub fn new_with_start_shape(
        start: ArrayIndices,
        shape: ArrayShape,
    ) -> Result<Self, IncompatibleDimensionalityError> {
        if start.len() == shape.len() {
            Ok(Self { start, shape })
        } else {
            Err(IncompatibleDimensionalityError::new(start.len(), shape.len()))
        }
    }

    /// Return the start of the array subset.
    #[must_use]
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Return the shape of the array subset.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Return the dimensionality of the array subset.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.start.len()
    }

    /// Return the number of elements of the array subset.
    ///
    /// Equal to the product of the components of its shape.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// Return the number of elements of the array subset as a `usize`.
    ///
    /// # Panics
    /// Panics if [`num_elements()`](Self::num_elements()) is greater than [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).unwrap()
    }

    /// Returns true if the array subset contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&size| size == 0)
    }

    /// Returns true if the array subset is within the bounds of `array_shape`.
    #[must_use]
    pub fn inbounds(&self, array_shape: &[u64]) -> bool {
        if self.dimensionality() != array_shape.len() {
            return false;
        }

        for (subset_start, subset_shape, shape) in izip!(self.start(), self.shape(), array_shape) {
            if subset_start + subset_shape > *shape {
                return false;
            }
        }
        true
    }

    /// Returns an iterator over the indices of elements within the subset.
    #[must_use]
    pub fn iter_indices(&self) -> IndicesIterator {
        IndicesIterator::new(self)
    }

    /// Returns an iterator over the linearised indices of contiguous elements within the subset of an array with shape `array_shape`.
    ///
    /// The iterator item is a tuple: (linearised index, # contiguous elements).
    ///
    /// # Errors
    /// Returns [`IncompatibleArrayShapeError`] if the `array_shape` does not encapsulate this array subset.
    pub fn iter_contiguous_linearised_indices(
        &self,
        array_shape: &[u64],
    ) -> Result<ContiguousLinearisedIndicesIterator, IncompatibleArrayShapeError> {
        ContiguousLinearisedIndicesIterator::new(self, array_shape)
    }

    /// Return the bytes in this array subset from an array with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayExtractBytesError`] if the length of `array_shape` does not match the array subset dimensionality, the array subset is outside of the bounds of `array_shape`, or the length of `bytes` does not match `array_shape` and `element_size`.
    ///
    /// # Panics
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<Vec<u8>, ArrayExtractBytesError> {
        let err = || ArrayExtractBytesError(self.clone(), array_shape.to_vec(), element_size);
        let element_size_u64 = element_size as u64;
        if bytes.len() as u64 != array_shape.iter().product::<u64>() * element_size_u64 {
            return Err(err());
        }
        let contiguous_indices = self
            .iter_contiguous_linearised_indices(array_shape)
            .map_err(|_| err())?;
        let mut bytes_subset = Vec::with_capacity(self.num_elements_usize() * element_size);
        for (array_index, contiguous_elements) in contiguous_indices {
            let byte_offset = usize::try_from(array_index * element_size_u64).unwrap();
            let byte_length = usize::try_from(contiguous_elements * element_size_u64).unwrap();
            bytes_subset.extend_from_slice(&bytes[byte_offset..byte_offset + byte_length]);
        }
        Ok(bytes_subset)
    }

    /// Store `subset_bytes` into this array subset of `array_bytes`, an array with shape `array_shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayStoreBytesError`] if
    ///  - the array subset is not within the bounds of `array_shape`,
    ///  - the length of `subset_bytes` does not match the array subset and `element_size`, or
    ///  - the length of `array_bytes` does not match `array_shape` and `element_size`.
    ///
    /// # Panics
    /// Panics if attempting to access a byte index beyond [`usize::MAX`].
    pub fn store_bytes(
        &self,
        subset_bytes: &[u8],
        array_bytes: &mut [u8],
        array_shape: &[u64],
        element_size: usize,
    ) -> Result<(), ArrayStoreBytesError> {
        let element_size_u64 = element_size as u64;
        let expected_subset_len = self.num_elements_usize() * element_size;
        if subset_bytes.len() != expected_subset_len {
            return Err(ArrayStoreBytesError::InvalidSubsetBytes(
                subset_bytes.len(),
                expected_subset_len,
            ));
        }
        let expected_array_len =
            usize::try_from(array_shape.iter().product::<u64>() * element_size_u64).unwrap();
        if array_bytes.len() != expected_array_len {
            return Err(ArrayStoreBytesError::InvalidArrayBytes(
                array_bytes.len(),
                expected_array_len,
            ));
        }
        let contiguous_indices = self
            .iter_contiguous_linearised_indices(array_shape)
            .map_err(|_| {
                ArrayStoreBytesError::InvalidArrayShape(self.clone(), array_shape.to_vec())
            })?;
        let mut subset_offset = 0;
        for (array_index, contiguous_elements) in contiguous_indices {
            let byte_offset = usize::try_from(array_index * element_size_u64).unwrap();
            let byte_length = usize::try_from(contiguous_elements * element_size_u64).unwrap();
            array_bytes[byte_offset..byte_offset + byte_length]
                .copy_from_slice(&subset_bytes[subset_offset..subset_offset + byte_length]);
            subset_offset += byte_length;
        }
        Ok(())
    }
}

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// An incompatible array shape error.
#[derive(Clone, Debug, Error, From)]
#[error("incompatible array shape {0:?} with array subset {1}")]
pub struct IncompatibleArrayShapeError(ArrayShape, ArraySubset);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_subset() {
        assert!(ArraySubset::new_with_start_shape(vec![0, 0], vec![10, 10]).is_ok());
        assert!(ArraySubset::new_with_start_shape(vec![0, 0], vec![10]).is_err());
        let array_subset = ArraySubset::new_with_ranges(&[1..4, 2..2]);
        assert_eq!(array_subset.shape(), &[3, 0]);
        assert!(array_subset.is_empty());
        assert_eq!(array_subset.num_elements(), 0);

        let array_subset = ArraySubset::new_with_start_shape(vec![1, 2], vec![3, 4]).unwrap();
        assert_eq!(array_subset.num_elements(), 12);
        assert!(array_subset.inbounds(&[4, 6]));
        assert!(!array_subset.inbounds(&[4, 5]));
        assert!(!array_subset.inbounds(&[4]));
        assert_eq!(array_subset.to_string(), "start [1, 2] shape [3, 4]");

        let array_subset = ArraySubset::new_with_ranges(&[1..4, 2..6, 5..3]);
        assert_eq!(array_subset.start(), &[1, 2, 5]);
        assert_eq!(array_subset.shape(), &[3, 4, 0]);
    }

    #[test]
    fn array_subset_extract_bytes() {
        // 4x4 array of u8 0..16
        let bytes: Vec<u8> = (0..16).collect();
        let array_subset = ArraySubset::new_with_start_shape(vec![1, 1], vec![2, 2]).unwrap();
        assert_eq!(
            array_subset.extract_bytes(&bytes, &[4, 4], 1).unwrap(),
            vec![5, 6, 9, 10]
        );
        let array_subset = ArraySubset::new_with_start_shape(vec![2, 0], vec![2, 4]).unwrap();
        assert_eq!(
            array_subset.extract_bytes(&bytes, &[4, 4], 1).unwrap(),
            (8..16).collect::<Vec<u8>>()
        );
        let array_subset = ArraySubset::new_with_start_shape(vec![3, 3], vec![2, 2]).unwrap();
        assert!(array_subset.extract_bytes(&bytes, &[4, 4], 1).is_err());
        assert!(array_subset.extract_bytes(&bytes, &[4, 4], 2).is_err());
    }

    #[test]
    fn array_subset_extract_bytes_multibyte() {
        let elements: Vec<u16> = (0..12).collect();
        let bytes: Vec<u8> = elements.iter().flat_map(|e| e.to_ne_bytes()).collect();
        let array_subset = ArraySubset::new_with_start_shape(vec![0, 1], vec![3, 1]).unwrap();
        let extracted = array_subset.extract_bytes(&bytes, &[3, 4], 2).unwrap();
        let extracted: Vec<u16> = extracted
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(extracted, vec![1, 5, 9]);
    }

    #[test]
    fn array_subset_extract_bytes_rank_zero() {
        let array_subset = ArraySubset::new_with_shape(vec![]);
        assert_eq!(array_subset.num_elements(), 1);
        assert_eq!(
            array_subset.extract_bytes(&[1, 2, 3, 4], &[], 4).unwrap(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn array_subset_store_bytes() {
        let mut array_bytes = vec![0u8; 9];
        let array_subset = ArraySubset::new_with_start_shape(vec![0, 0], vec![2, 2]).unwrap();
        array_subset
            .store_bytes(&[1, 2, 3, 4], &mut array_bytes, &[3, 3], 1)
            .unwrap();
        assert_eq!(array_bytes, vec![1, 2, 0, 3, 4, 0, 0, 0, 0]);
        assert!(array_subset
            .store_bytes(&[1, 2, 3], &mut array_bytes, &[3, 3], 1)
            .is_err());
        assert!(array_subset
            .store_bytes(&[1, 2, 3, 4], &mut array_bytes, &[2, 2], 1)
            .is_err());
        assert!(array_subset
            .store_bytes(&[1, 2, 3, 4], &mut array_bytes[..4], &[1, 1], 1)
            .is_err());
    }
}
