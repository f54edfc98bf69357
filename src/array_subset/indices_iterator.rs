use std::iter::FusedIterator;

use crate::array::{ArrayIndices, ArrayShape};

use super::ArraySubset;

/// Iterates over element indices in an array subset in C (row-major) order.
pub struct IndicesIterator {
    start: ArrayIndices,
    shape: ArrayShape,
    offset: ArrayIndices,
    remaining: u64,
}

impl IndicesIterator {
    /// Create a new indices iterator.
    #[must_use]
    pub fn new(subset: &ArraySubset) -> Self {
        Self {
            start: subset.start().to_vec(),
            shape: subset.shape().to_vec(),
            offset: vec![0; subset.dimensionality()],
            remaining: subset.num_elements(),
        }
    }
}

impl Iterator for IndicesIterator {
    type Item = ArrayIndices;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let indices = std::iter::zip(&self.start, &self.offset)
            .map(|(start, offset)| start + offset)
            .collect();
        self.remaining -= 1;
        for (offset, &size) in std::iter::zip(self.offset.iter_mut(), &self.shape).rev() {
            *offset += 1;
            if *offset < size {
                break;
            }
            *offset = 0;
        }
        Some(indices)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndicesIterator {}

impl FusedIterator for IndicesIterator {}
