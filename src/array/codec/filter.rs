//! Filters.
//!
//! A filter is a reversible transform of the elements of a chunk applied before compression.
//! Filters that interpret elements declare their data type with a `numcodecs` type string, e.g. `"dtype": "<i4"`, and honour its byte order.

pub mod delta;
pub mod fixedscaleoffset;
pub mod shuffle;

use crate::array::{DataType, Endianness, UnsupportedDataTypeError};

/// Parse the data type of a filter configuration.
///
/// A missing byte order character is interpreted as little endian, or `|` for single byte types.
pub(crate) fn parse_filter_dtype(
    dtype: &str,
) -> Result<(DataType, Endianness), UnsupportedDataTypeError> {
    if dtype.starts_with(['<', '>', '|', '=']) {
        DataType::from_dtype_v2(dtype)
    } else {
        DataType::from_dtype_v2(&format!("<{dtype}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_dtype_without_byte_order() {
        assert_eq!(
            parse_filter_dtype("i4").unwrap(),
            (DataType::Int32, Endianness::Little)
        );
        assert_eq!(parse_filter_dtype("u1").unwrap().0, DataType::UInt8);
        assert_eq!(
            parse_filter_dtype(">f8").unwrap(),
            (DataType::Float64, Endianness::Big)
        );
        assert!(parse_filter_dtype("x4").is_err());
    }
}
