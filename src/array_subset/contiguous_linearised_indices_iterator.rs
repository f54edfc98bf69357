use std::iter::FusedIterator;

use itertools::izip;

use crate::array::{ravel_indices, ArrayShape};

use super::{ArraySubset, IncompatibleArrayShapeError, IndicesIterator};

/// Iterates over contiguous linearised element indices in an array subset.
///
/// The iterator item is a tuple: (linearised index, # contiguous elements).
pub struct ContiguousLinearisedIndicesIterator {
    inner: IndicesIterator,
    array_shape: ArrayShape,
    contiguous_elements: u64,
}

impl ContiguousLinearisedIndicesIterator {
    /// Create a new contiguous linearised indices iterator.
    ///
    /// # Errors
    /// Returns [`IncompatibleArrayShapeError`] if `array_shape` does not encapsulate `subset`.
    pub fn new(
        subset: &ArraySubset,
        array_shape: &[u64],
    ) -> Result<Self, IncompatibleArrayShapeError> {
        if !subset.inbounds(array_shape) {
            return Err(IncompatibleArrayShapeError(
                array_shape.to_vec(),
                subset.clone(),
            ));
        }

        // Trailing dimensions spanning the whole array are merged into one run
        let mut contiguous = true;
        let mut contiguous_elements = 1;
        let mut shape_out = vec![0; array_shape.len()];
        for (&subset_start, &subset_size, &array_size, shape_out_i) in izip!(
            subset.start().iter().rev(),
            subset.shape().iter().rev(),
            array_shape.iter().rev(),
            shape_out.iter_mut().rev(),
        ) {
            if contiguous {
                contiguous_elements *= subset_size;
                *shape_out_i = 1;
                contiguous = subset_start == 0 && subset_size == array_size;
            } else {
                *shape_out_i = subset_size;
            }
        }
        let subset_contiguous_start =
            ArraySubset::new_with_start_shape(subset.start().to_vec(), shape_out)
                .map_err(|_| IncompatibleArrayShapeError(array_shape.to_vec(), subset.clone()))?;
        Ok(Self {
            inner: subset_contiguous_start.iter_indices(),
            array_shape: array_shape.to_vec(),
            contiguous_elements,
        })
    }

    /// Return the number of contiguous elements (fixed on each iteration).
    #[must_use]
    pub fn contiguous_elements(&self) -> u64 {
        self.contiguous_elements
    }
}

impl Iterator for ContiguousLinearisedIndicesIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|indices| {
            (
                ravel_indices(&indices, &self.array_shape),
                self.contiguous_elements,
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ContiguousLinearisedIndicesIterator {}

impl FusedIterator for ContiguousLinearisedIndicesIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_linearised_indices_iterator() {
        let subset = ArraySubset::new_with_start_shape(vec![1, 0], vec![2, 4]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[4, 4]).unwrap();
        assert_eq!(iter.contiguous_elements(), 8);
        assert_eq!(iter.collect::<Vec<_>>(), vec![(4, 8)]);

        let subset = ArraySubset::new_with_start_shape(vec![1, 1], vec![2, 2]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[4, 4]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(5, 2), (9, 2)]);

        let subset = ArraySubset::new_with_start_shape(vec![0, 1, 0], vec![2, 1, 3]).unwrap();
        let iter = subset.iter_contiguous_linearised_indices(&[2, 2, 3]).unwrap();
        assert_eq!(iter.collect::<Vec<_>>(), vec![(3, 3), (9, 3)]);
    }

    #[test]
    fn contiguous_linearised_indices_iterator_out_of_bounds() {
        let subset = ArraySubset::new_with_start_shape(vec![3, 3], vec![2, 2]).unwrap();
        assert!(subset.iter_contiguous_linearised_indices(&[4, 4]).is_err());
    }
}
