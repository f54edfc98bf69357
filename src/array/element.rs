use half::f16;
use num::complex::{Complex32, Complex64};
use thiserror::Error;

use super::DataType;

/// An element type is incompatible with a data type.
#[derive(Debug, Error)]
#[error("element type {_0} is incompatible with data type {_1}")]
pub struct IncompatibleElementTypeError(&'static str, DataType);

/// A type that can be the element of an in-memory variable.
pub trait Element: Copy + Send + Sync + 'static {
    /// Validate that the element type is compatible with `data_type`.
    ///
    /// # Errors
    /// Returns an [`IncompatibleElementTypeError`] if the element type is incompatible with `data_type`.
    fn validate_data_type(data_type: DataType) -> Result<(), IncompatibleElementTypeError>;

    /// Convert a slice of elements to native endian bytes.
    fn into_ne_bytes(elements: &[Self]) -> Vec<u8>;
}

macro_rules! impl_element_pod {
    ($raw_type:ty, $( $data_type:pat ),+) => {
        impl Element for $raw_type {
            fn validate_data_type(data_type: DataType) -> Result<(), IncompatibleElementTypeError> {
                match data_type {
                    $( $data_type )|+ => Ok(()),
                    _ => Err(IncompatibleElementTypeError(
                        stringify!($raw_type),
                        data_type,
                    )),
                }
            }

            fn into_ne_bytes(elements: &[Self]) -> Vec<u8> {
                bytemuck::cast_slice(elements).to_vec()
            }
        }
    };
}

impl_element_pod!(i8, DataType::Int8);
impl_element_pod!(i16, DataType::Int16);
impl_element_pod!(i32, DataType::Int32);
impl_element_pod!(
    i64,
    DataType::Int64,
    DataType::DateTime64(_),
    DataType::TimeDelta64(_)
);
impl_element_pod!(u8, DataType::UInt8);
impl_element_pod!(u16, DataType::UInt16);
impl_element_pod!(u32, DataType::UInt32);
impl_element_pod!(u64, DataType::UInt64);
impl_element_pod!(f16, DataType::Float16);
impl_element_pod!(f32, DataType::Float32);
impl_element_pod!(f64, DataType::Float64);
impl_element_pod!(Complex32, DataType::Complex64);
impl_element_pod!(Complex64, DataType::Complex128);

impl Element for bool {
    fn validate_data_type(data_type: DataType) -> Result<(), IncompatibleElementTypeError> {
        if data_type == DataType::Bool {
            Ok(())
        } else {
            Err(IncompatibleElementTypeError("bool", data_type))
        }
    }

    fn into_ne_bytes(elements: &[Self]) -> Vec<u8> {
        elements.iter().map(|&element| u8::from(element)).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::array::TimeUnit;

    use super::*;

    #[test]
    fn element_validate_data_type() {
        assert!(f32::validate_data_type(DataType::Float32).is_ok());
        assert!(f32::validate_data_type(DataType::Float64).is_err());
        assert!(i64::validate_data_type(DataType::DateTime64(TimeUnit::Nanosecond)).is_ok());
        assert!(bool::validate_data_type(DataType::UInt8).is_err());
    }

    #[test]
    fn element_into_ne_bytes() {
        assert_eq!(
            u16::into_ne_bytes(&[1, 2]),
            [1u16.to_ne_bytes(), 2u16.to_ne_bytes()].concat()
        );
        assert_eq!(bool::into_ne_bytes(&[true, false]), vec![1, 0]);
        assert_eq!(
            Complex32::into_ne_bytes(&[Complex32::new(1.0, 2.0)]),
            [1.0f32.to_ne_bytes(), 2.0f32.to_ne_bytes()].concat()
        );
    }
}
