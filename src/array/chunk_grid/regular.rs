//! The regular chunk grid.

use crate::array_subset::ArraySubset;

use super::{
    super::{ArrayIndices, ArrayShape, ChunkShape},
    parse_chunk_key, ChunkKeyError,
};

/// A regular chunk grid, the chunk grid of every Zarr V2 array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularChunkGrid {
    chunk_shape: ChunkShape,
}

impl RegularChunkGrid {
    /// Create a new regular chunk grid with chunk shape `chunk_shape`.
    #[must_use]
    pub fn new(chunk_shape: ChunkShape) -> Self {
        Self { chunk_shape }
    }

    /// Return the chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &ChunkShape {
        &self.chunk_shape
    }

    /// Return the dimensionality of the grid.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.chunk_shape.len()
    }

    /// Return the number of chunks along each dimension of an array with shape `array_shape`.
    #[must_use]
    pub fn grid_shape(&self, array_shape: &[u64]) -> ArrayShape {
        debug_assert_eq!(array_shape.len(), self.dimensionality());
        std::iter::zip(array_shape, self.chunk_shape.iter())
            .map(|(&a, s)| a.div_ceil(s.get()))
            .collect()
    }

    /// Return the subset of an array with shape `array_shape` covered by the chunk at `chunk_indices`.
    ///
    /// Along each dimension the subset spans `[i * c, min(i * c + c, s))`, so trailing chunks are truncated to the array bounds.
    /// The subset is empty along any dimension where the chunk starts beyond the array.
    #[must_use]
    pub fn chunk_subset(&self, chunk_indices: &[u64], array_shape: &[u64]) -> ArraySubset {
        debug_assert_eq!(chunk_indices.len(), self.dimensionality());
        let ranges: Vec<_> = itertools::izip!(chunk_indices, self.chunk_shape.iter(), array_shape)
            .map(|(&i, c, &s)| {
                let start = i.saturating_mul(c.get());
                start..start.saturating_add(c.get()).min(s)
            })
            .collect();
        ArraySubset::new_with_ranges(&ranges)
    }

    /// Locate the chunk with key `chunk_key` in an array with shape `array_shape`.
    ///
    /// Returns the chunk grid indices of the chunk and the array subset it covers.
    ///
    /// # Errors
    /// Returns a [`ChunkKeyError`] if the chunk key is malformed, has the wrong number of components, or is outside of the chunk grid.
    pub fn locate(
        &self,
        chunk_key: &str,
        array_shape: &[u64],
    ) -> Result<(ArrayIndices, ArraySubset), ChunkKeyError> {
        let chunk_indices = parse_chunk_key(chunk_key, &self.grid_shape(array_shape))?;
        let subset = self.chunk_subset(&chunk_indices, array_shape);
        Ok((chunk_indices, subset))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn chunk_grid_regular() {
        let array_shape: ArrayShape = vec![5, 7, 52];
        let chunk_grid = RegularChunkGrid::new(vec![1, 2, 3].try_into().unwrap());

        assert_eq!(chunk_grid.dimensionality(), 3);
        assert_eq!(chunk_grid.chunk_shape().to_array_shape(), vec![1, 2, 3]);
        assert_eq!(chunk_grid.grid_shape(&array_shape), vec![5, 4, 18]);

        let subset = chunk_grid.chunk_subset(&[1, 1, 1], &array_shape);
        assert_eq!(subset.start(), &[1, 2, 3]);
        assert_eq!(subset.shape(), &[1, 2, 3]);

        // trailing chunk is truncated
        let subset = chunk_grid.chunk_subset(&[4, 3, 17], &array_shape);
        assert_eq!(subset.start(), &[4, 6, 51]);
        assert_eq!(subset.shape(), &[1, 1, 1]);

    }

    #[test]
    fn chunk_grid_regular_beyond_array() {
        let chunk_grid = RegularChunkGrid::new(vec![4].try_into().unwrap());
        let subset = chunk_grid.chunk_subset(&[3], &[10]);
        assert_eq!(subset.start(), &[12]);
        assert!(subset.is_empty());
        let subset = chunk_grid.chunk_subset(&[u64::MAX], &[10]);
        assert!(subset.is_empty());
    }

    #[test]
    fn chunk_grid_regular_locate() {
        let chunk_grid = RegularChunkGrid::new(vec![5, 5].try_into().unwrap());
        let (indices, subset) = chunk_grid.locate("1.0", &[10, 7]).unwrap();
        assert_eq!(indices, vec![1, 0]);
        assert_eq!(subset.start(), &[5, 0]);
        assert_eq!(subset.shape(), &[5, 5]);
        let (_, subset) = chunk_grid.locate("1.1", &[10, 7]).unwrap();
        assert_eq!(subset.shape(), &[5, 2]);
        assert!(matches!(
            chunk_grid.locate("2.0", &[10, 7]),
            Err(ChunkKeyError::OutOfRange { .. })
        ));
        assert!(matches!(
            chunk_grid.locate("0", &[10, 7]),
            Err(ChunkKeyError::RankMismatch { .. })
        ));
    }

    #[test]
    fn chunk_grid_regular_zero_dimensional() {
        let chunk_grid = RegularChunkGrid::new(Vec::<u64>::new().try_into().unwrap());
        assert_eq!(chunk_grid.grid_shape(&[]), Vec::<u64>::new());
        let (indices, subset) = chunk_grid.locate("0", &[]).unwrap();
        assert!(indices.is_empty());
        assert_eq!(subset.num_elements(), 1);
    }

    #[test]
    fn chunk_grid_regular_slice_lengths() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let dimensionality = rng.gen_range(1..4);
            let array_shape: ArrayShape =
                (0..dimensionality).map(|_| rng.gen_range(0..20)).collect();
            let chunk_shape: ArrayShape =
                (0..dimensionality).map(|_| rng.gen_range(1..8)).collect();
            let chunk_grid = RegularChunkGrid::new(chunk_shape.clone().try_into().unwrap());
            let grid_shape = chunk_grid.grid_shape(&array_shape);
            let chunk_indices: ArrayIndices = grid_shape
                .iter()
                .map(|&g| rng.gen_range(0..g.max(1) + 1))
                .collect();
            let subset = chunk_grid.chunk_subset(&chunk_indices, &array_shape);
            for (i, ((&k, &c), &s)) in chunk_indices
                .iter()
                .zip(&chunk_shape)
                .zip(&array_shape)
                .enumerate()
            {
                let expected = if k * c >= s { 0 } else { c.min(s - k * c) };
                assert_eq!(subset.shape()[i], expected);
            }
        }
    }
}
