//! Backing stores for the elements of a variable.

use bytes::Bytes;
use thiserror::Error;

use crate::array_subset::{ArrayExtractBytesError, ArraySubset};

use super::{ArrayShape, Element};

/// An array data error.
#[derive(Debug, Error)]
pub enum ArrayDataError {
    /// The subset is out of bounds of the array.
    #[error("array subset {_0} is out of bounds of array with shape {_1:?}")]
    SubsetOutOfBounds(ArraySubset, ArrayShape),
    /// The bytes do not have the expected length.
    #[error("got {got} bytes, expected {expected}")]
    UnexpectedLength {
        /// The expected number of bytes.
        expected: usize,
        /// The actual number of bytes.
        got: usize,
    },
    /// The bytes of the subset could not be extracted.
    #[error(transparent)]
    ExtractBytesError(#[from] ArrayExtractBytesError),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for ArrayDataError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for ArrayDataError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// The elements of a variable.
///
/// Reading a subset may block and may be expensive, for example if the elements are computed on demand.
pub trait ArrayData: Send + Sync + core::fmt::Debug {
    /// Return the shape of the array.
    fn shape(&self) -> &[u64];

    /// Return the size in bytes of an element.
    fn element_size(&self) -> usize;

    /// Read the elements of `subset` as contiguous C order native endian bytes.
    ///
    /// # Errors
    /// Returns an [`ArrayDataError`] if the subset is out of bounds or the elements cannot be read.
    fn read_subset(&self, subset: &ArraySubset) -> Result<Vec<u8>, ArrayDataError>;
}

fn expected_len(num_elements: u64, element_size: usize) -> usize {
    usize::try_from(num_elements)
        .unwrap_or(usize::MAX)
        .saturating_mul(element_size)
}

fn check_inbounds(subset: &ArraySubset, shape: &[u64]) -> Result<(), ArrayDataError> {
    if subset.inbounds(shape) {
        Ok(())
    } else {
        Err(ArrayDataError::SubsetOutOfBounds(
            subset.clone(),
            shape.to_vec(),
        ))
    }
}

/// Array data held in memory as contiguous C order native endian bytes.
#[derive(Debug, Clone)]
pub struct InMemoryArrayData {
    shape: ArrayShape,
    element_size: usize,
    bytes: Bytes,
}

impl InMemoryArrayData {
    /// Create in memory array data from `bytes`, the C order native endian bytes of an array with `shape` and `element_size`.
    ///
    /// # Errors
    /// Returns [`ArrayDataError::UnexpectedLength`] if the length of `bytes` does not match `shape` and `element_size`.
    pub fn new(
        shape: ArrayShape,
        element_size: usize,
        bytes: impl Into<Bytes>,
    ) -> Result<Self, ArrayDataError> {
        let bytes = bytes.into();
        let expected = expected_len(shape.iter().product(), element_size);
        if bytes.len() == expected {
            Ok(Self {
                shape,
                element_size,
                bytes,
            })
        } else {
            Err(ArrayDataError::UnexpectedLength {
                expected,
                got: bytes.len(),
            })
        }
    }

    /// Create in memory array data from C order `elements` of an array with `shape`.
    ///
    /// # Errors
    /// Returns [`ArrayDataError::UnexpectedLength`] if the number of elements does not match `shape`.
    pub fn from_elements<T: Element>(
        shape: ArrayShape,
        elements: &[T],
    ) -> Result<Self, ArrayDataError> {
        Self::new(shape, std::mem::size_of::<T>(), T::into_ne_bytes(elements))
    }

    #[cfg(feature = "ndarray")]
    /// Create in memory array data from an [`ndarray::ArrayBase`] in any memory layout.
    pub fn from_ndarray<T: Element, S: ndarray::Data<Elem = T>, D: ndarray::Dimension>(
        array: &ndarray::ArrayBase<S, D>,
    ) -> Self {
        let shape = array.shape().iter().map(|&s| s as u64).collect();
        let elements: Vec<T> = array.iter().copied().collect();
        Self {
            shape,
            element_size: std::mem::size_of::<T>(),
            bytes: Bytes::from(T::into_ne_bytes(&elements)),
        }
    }

    /// Return the bytes of the array.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl ArrayData for InMemoryArrayData {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    fn element_size(&self) -> usize {
        self.element_size
    }

    fn read_subset(&self, subset: &ArraySubset) -> Result<Vec<u8>, ArrayDataError> {
        check_inbounds(subset, &self.shape)?;
        if subset.shape() == self.shape.as_slice() {
            return Ok(self.bytes.to_vec());
        }
        Ok(subset.extract_bytes(&self.bytes, &self.shape, self.element_size)?)
    }
}

type ComputeFn = dyn Fn(&ArraySubset) -> Result<Vec<u8>, ArrayDataError> + Send + Sync;

/// Array data computed on demand.
///
/// Every read of a subset calls the compute function, which must return the C order native endian bytes of the subset.
pub struct ComputedArrayData {
    shape: ArrayShape,
    element_size: usize,
    compute: Box<ComputeFn>,
}

impl core::fmt::Debug for ComputedArrayData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComputedArrayData")
            .field("shape", &self.shape)
            .field("element_size", &self.element_size)
            .finish_non_exhaustive()
    }
}

impl ComputedArrayData {
    /// Create array data with `shape` and `element_size` computed by `compute`.
    pub fn new(
        shape: ArrayShape,
        element_size: usize,
        compute: impl Fn(&ArraySubset) -> Result<Vec<u8>, ArrayDataError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape,
            element_size,
            compute: Box::new(compute),
        }
    }

    /// Create array data with `shape` where each element is computed from its indices by `element_fn`.
    pub fn from_element_fn<T: Element>(
        shape: ArrayShape,
        element_fn: impl Fn(&[u64]) -> T + Send + Sync + 'static,
    ) -> Self {
        Self::new(shape, std::mem::size_of::<T>(), move |subset| {
            let elements: Vec<T> = subset
                .iter_indices()
                .map(|indices| element_fn(&indices))
                .collect();
            Ok(T::into_ne_bytes(&elements))
        })
    }
}

impl ArrayData for ComputedArrayData {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    fn element_size(&self) -> usize {
        self.element_size
    }

    fn read_subset(&self, subset: &ArraySubset) -> Result<Vec<u8>, ArrayDataError> {
        check_inbounds(subset, &self.shape)?;
        let bytes = (self.compute)(subset)?;
        let expected = expected_len(subset.num_elements(), self.element_size);
        if bytes.len() == expected {
            Ok(bytes)
        } else {
            Err(ArrayDataError::UnexpectedLength {
                expected,
                got: bytes.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn in_memory_array_data() {
        let elements: Vec<u16> = (0..12).collect();
        let data = InMemoryArrayData::from_elements(vec![3, 4], &elements).unwrap();
        assert_eq!(data.shape(), &[3, 4]);
        assert_eq!(data.element_size(), 2);

        let subset = ArraySubset::new_with_start_shape(vec![1, 2], vec![2, 2]).unwrap();
        let bytes = data.read_subset(&subset).unwrap();
        let expected: Vec<u16> = vec![6, 7, 10, 11];
        assert_eq!(bytes, bytemuck::cast_slice::<u16, u8>(&expected));

        let subset = ArraySubset::new_with_start_shape(vec![2, 2], vec![2, 2]).unwrap();
        assert!(matches!(
            data.read_subset(&subset),
            Err(ArrayDataError::SubsetOutOfBounds(..))
        ));

        assert!(matches!(
            InMemoryArrayData::from_elements(vec![3, 5], &elements),
            Err(ArrayDataError::UnexpectedLength {
                expected: 30,
                got: 24
            })
        ));
    }

    #[test]
    fn in_memory_array_data_empty_subset() {
        let data = InMemoryArrayData::new(vec![2, 2], 1, vec![1, 2, 3, 4]).unwrap();
        let subset = ArraySubset::new_with_start_shape(vec![2, 0], vec![0, 2]).unwrap();
        assert!(data.read_subset(&subset).unwrap().is_empty());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn in_memory_array_data_ndarray() {
        let array = ndarray::Array2::<i32>::from_shape_fn((2, 3), |(i, j)| (i * 3 + j) as i32);
        let data = InMemoryArrayData::from_ndarray(&array.t());
        assert_eq!(data.shape(), &[3, 2]);
        let elements: Vec<i32> = vec![0, 3, 1, 4, 2, 5];
        assert_eq!(
            data.bytes().as_ref(),
            bytemuck::cast_slice::<i32, u8>(&elements)
        );
    }

    #[test]
    fn computed_array_data() {
        let reads = Arc::new(AtomicUsize::new(0));
        let data = {
            let reads = reads.clone();
            ComputedArrayData::from_element_fn(vec![4, 4], move |indices: &[u64]| {
                reads.fetch_add(1, Ordering::Relaxed);
                (indices[0] * 10 + indices[1]) as u8
            })
        };
        let subset = ArraySubset::new_with_start_shape(vec![2, 1], vec![2, 3]).unwrap();
        assert_eq!(data.read_subset(&subset).unwrap(), vec![21, 22, 23, 31, 32, 33]);
        assert_eq!(reads.load(Ordering::Relaxed), 6);

        let bad = ComputedArrayData::new(vec![4], 1, |_subset| Ok(vec![0; 2]));
        assert!(matches!(
            bad.read_subset(&ArraySubset::new_with_shape(vec![4])),
            Err(ArrayDataError::UnexpectedLength {
                expected: 4,
                got: 2
            })
        ));
        let failing = ComputedArrayData::new(vec![4], 1, |_subset| Err("unavailable".into()));
        assert!(failing.read_subset(&ArraySubset::new_with_shape(vec![4])).is_err());
    }
}
