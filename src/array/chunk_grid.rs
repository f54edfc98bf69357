//! Chunk grids and chunk keys.
//!
//! A Zarr V2 array is divided into a regular grid of chunks of the nominal chunk shape.
//! Chunks on the trailing edge of each dimension are truncated to the bounds of the array.
//!
//! A chunk is identified by its chunk key, the grid indices of the chunk joined by the `.` dimension separator (e.g. `1.0.3`).
//! A zero-dimensional array has a single chunk with key `0`.

mod regular;

pub use regular::RegularChunkGrid;

use itertools::Itertools;
use thiserror::Error;

use super::{ArrayIndices, ArrayShape};

/// The chunk key dimension separator.
pub const CHUNK_KEY_SEPARATOR: char = '.';

/// A chunk key error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChunkKeyError {
    /// The key is not a sequence of dot-separated integers.
    #[error("invalid chunk key {_0:?}")]
    InvalidKey(String),
    /// The number of key components does not match the dimensionality of the array.
    #[error("chunk key {key:?} has {got} components, expected {expected}")]
    RankMismatch {
        /// The chunk key.
        key: String,
        /// The number of components of the key.
        got: usize,
        /// The dimensionality of the array.
        expected: usize,
    },
    /// A key component is negative or outside of the chunk grid.
    #[error("chunk key {key:?} is out of range of chunk grid with shape {grid_shape:?}")]
    OutOfRange {
        /// The chunk key.
        key: String,
        /// The shape of the chunk grid.
        grid_shape: ArrayShape,
    },
}

/// Parse a single chunk key component, returning [`None`] if the component is negative.
fn parse_component(key: &str, component: &str) -> Result<Option<u64>, ChunkKeyError> {
    let (negative, digits) = match component.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, component),
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ChunkKeyError::InvalidKey(key.to_string()));
    }
    let is_zero = digits.bytes().all(|byte| byte == b'0');
    if negative && !is_zero {
        return Ok(None);
    }
    // All digits, so a parse failure can only be an overflow
    Ok(Some(digits.parse::<u64>().unwrap_or(u64::MAX)))
}

/// Parse a chunk key into chunk grid indices for a chunk grid with shape `grid_shape`.
///
/// # Errors
/// Returns a [`ChunkKeyError`] if:
///  - the key is not a sequence of `.` separated integers,
///  - the number of components does not match the length of `grid_shape`, or
///  - a component is negative or not less than the corresponding grid dimension.
pub fn parse_chunk_key(key: &str, grid_shape: &[u64]) -> Result<ArrayIndices, ChunkKeyError> {
    let out_of_range = || ChunkKeyError::OutOfRange {
        key: key.to_string(),
        grid_shape: grid_shape.to_vec(),
    };

    if grid_shape.is_empty() {
        return match parse_component(key, key)? {
            Some(0) => Ok(vec![]),
            _ => Err(out_of_range()),
        };
    }

    let components: Vec<&str> = key.split(CHUNK_KEY_SEPARATOR).collect();
    if components.len() != grid_shape.len() {
        return Err(ChunkKeyError::RankMismatch {
            key: key.to_string(),
            got: components.len(),
            expected: grid_shape.len(),
        });
    }

    let mut indices = Vec::with_capacity(components.len());
    for (component, &grid_dim) in std::iter::zip(components, grid_shape) {
        match parse_component(key, component)? {
            Some(index) if index < grid_dim => indices.push(index),
            _ => return Err(out_of_range()),
        }
    }
    Ok(indices)
}

/// Encode chunk grid indices as a chunk key.
#[must_use]
pub fn chunk_key(chunk_indices: &[u64]) -> String {
    if chunk_indices.is_empty() {
        "0".to_string()
    } else {
        chunk_indices.iter().join(&CHUNK_KEY_SEPARATOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_parse() {
        assert_eq!(parse_chunk_key("1.0", &[2, 2]).unwrap(), vec![1, 0]);
        assert_eq!(parse_chunk_key("007", &[10]).unwrap(), vec![7]);
        assert_eq!(parse_chunk_key("-0.1", &[2, 2]).unwrap(), vec![0, 1]);
        assert_eq!(parse_chunk_key("0", &[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn chunk_key_out_of_range() {
        for key in ["2.0", "0.2", "-1.0", "0.99999999999999999999999"] {
            assert!(
                matches!(
                    parse_chunk_key(key, &[2, 2]),
                    Err(ChunkKeyError::OutOfRange { .. })
                ),
                "{key}"
            );
        }
        assert!(matches!(
            parse_chunk_key("1", &[]),
            Err(ChunkKeyError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_chunk_key("0", &[0]),
            Err(ChunkKeyError::OutOfRange { .. })
        ));
    }

    #[test]
    fn chunk_key_rank_mismatch() {
        assert_eq!(
            parse_chunk_key("0.0.0", &[2, 2]),
            Err(ChunkKeyError::RankMismatch {
                key: "0.0.0".to_string(),
                got: 3,
                expected: 2
            })
        );
        assert!(matches!(
            parse_chunk_key("0", &[2, 2]),
            Err(ChunkKeyError::RankMismatch { got: 1, .. })
        ));
    }

    #[test]
    fn chunk_key_invalid() {
        for key in ["", "a.0", "0.", "+1.0", " 1.0", "1.0 ", "0x1.0", "1/0", "1.-"] {
            let result = parse_chunk_key(key, &[2, 2]);
            assert!(
                matches!(
                    result,
                    Err(ChunkKeyError::InvalidKey(_) | ChunkKeyError::RankMismatch { .. })
                ),
                "{key}: {result:?}"
            );
        }
        assert!(matches!(
            parse_chunk_key("0.0", &[2, 2, 2]),
            Err(ChunkKeyError::RankMismatch { .. })
        ));
        assert!(matches!(
            parse_chunk_key(".zarray", &[2]),
            Err(ChunkKeyError::RankMismatch { .. })
        ));
    }

    #[test]
    fn chunk_key_encode() {
        assert_eq!(chunk_key(&[1, 0, 12]), "1.0.12");
        assert_eq!(chunk_key(&[]), "0");
        assert_eq!(parse_chunk_key(&chunk_key(&[3, 4]), &[5, 5]).unwrap(), vec![3, 4]);
    }
}
