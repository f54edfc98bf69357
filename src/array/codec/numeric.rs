//! Numeric element helpers for filters that operate on typed elements.

use crate::array::{DataType, Endianness};

use super::CodecError;

/// A numeric element that a filter can read from and write to bytes of either endianness.
pub(crate) trait NumericElement: Copy + Default {
    const SIZE: usize;

    fn read(bytes: &[u8], endianness: Endianness) -> Self;

    fn write(self, bytes: &mut [u8], endianness: Endianness);

    /// Subtraction, wrapping on overflow for integers.
    fn delta_sub(self, rhs: Self) -> Self;

    /// Addition, wrapping on overflow for integers.
    fn delta_add(self, rhs: Self) -> Self;

    fn to_f64(self) -> f64;

    /// Convert from `f64` with `as` semantics (truncation towards zero, saturating).
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_numeric_element {
    ($t:ty, int) => {
        impl_numeric_element!($t, wrapping_sub, wrapping_add);
    };
    ($t:ty, float) => {
        impl_numeric_element!($t, sub, add);
    };
    ($t:ty, $sub:ident, $add:ident) => {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss,
            clippy::cast_lossless
        )]
        impl NumericElement for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            fn read(bytes: &[u8], endianness: Endianness) -> Self {
                let mut array = [0u8; std::mem::size_of::<$t>()];
                array.copy_from_slice(bytes);
                match endianness {
                    Endianness::Little => <$t>::from_le_bytes(array),
                    Endianness::Big => <$t>::from_be_bytes(array),
                }
            }

            fn write(self, bytes: &mut [u8], endianness: Endianness) {
                match endianness {
                    Endianness::Little => bytes.copy_from_slice(&self.to_le_bytes()),
                    Endianness::Big => bytes.copy_from_slice(&self.to_be_bytes()),
                }
            }

            fn delta_sub(self, rhs: Self) -> Self {
                #[allow(unused_imports)]
                use std::ops::Sub;
                self.$sub(rhs)
            }

            fn delta_add(self, rhs: Self) -> Self {
                #[allow(unused_imports)]
                use std::ops::Add;
                self.$add(rhs)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }
        }
    };
}

impl_numeric_element!(i8, int);
impl_numeric_element!(i16, int);
impl_numeric_element!(i32, int);
impl_numeric_element!(i64, int);
impl_numeric_element!(u8, int);
impl_numeric_element!(u16, int);
impl_numeric_element!(u32, int);
impl_numeric_element!(u64, int);
impl_numeric_element!(f32, float);
impl_numeric_element!(f64, float);

/// Read the elements of `bytes`.
pub(crate) fn read_elements<T: NumericElement>(
    bytes: &[u8],
    endianness: Endianness,
) -> Result<Vec<T>, CodecError> {
    if bytes.len() % T::SIZE != 0 {
        return Err(CodecError::UnexpectedLength {
            len: bytes.len(),
            element_size: T::SIZE,
        });
    }
    Ok(bytes
        .chunks_exact(T::SIZE)
        .map(|element| T::read(element, endianness))
        .collect())
}

/// Write `elements` to bytes.
pub(crate) fn write_elements<T: NumericElement>(elements: &[T], endianness: Endianness) -> Vec<u8> {
    let mut bytes = vec![0u8; elements.len() * T::SIZE];
    for (element, out) in std::iter::zip(elements, bytes.chunks_exact_mut(T::SIZE)) {
        element.write(out, endianness);
    }
    bytes
}

/// Read the elements of `bytes` as `f64`.
pub(crate) fn read_as_f64<T: NumericElement>(
    bytes: &[u8],
    endianness: Endianness,
) -> Result<Vec<f64>, CodecError> {
    Ok(read_elements::<T>(bytes, endianness)?
        .into_iter()
        .map(T::to_f64)
        .collect())
}

/// Convert `values` to elements and write them to bytes.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn write_from_f64<T: NumericElement>(
    values: &[f64],
    endianness: Endianness,
) -> Result<Vec<u8>, CodecError> {
    let elements: Vec<T> = values.iter().map(|&value| T::from_f64(value)).collect();
    Ok(write_elements(&elements, endianness))
}

/// Call a generic function `$func::<T>($args)` with the element type `T` of a numeric data type.
///
/// Evaluates to `Err(CodecError::UnsupportedDataType)` for data types without a numeric element type.
macro_rules! dispatch_numeric {
    ($data_type:expr, $identifier:expr, $func:ident ( $($args:expr),* )) => {
        match $data_type {
            $crate::array::DataType::Int8 => $func::<i8>($($args),*),
            $crate::array::DataType::Int16 => $func::<i16>($($args),*),
            $crate::array::DataType::Int32 => $func::<i32>($($args),*),
            $crate::array::DataType::Int64 => $func::<i64>($($args),*),
            $crate::array::DataType::UInt8 => $func::<u8>($($args),*),
            $crate::array::DataType::UInt16 => $func::<u16>($($args),*),
            $crate::array::DataType::UInt32 => $func::<u32>($($args),*),
            $crate::array::DataType::UInt64 => $func::<u64>($($args),*),
            $crate::array::DataType::Float32 => $func::<f32>($($args),*),
            $crate::array::DataType::Float64 => $func::<f64>($($args),*),
            data_type => Err($crate::array::codec::CodecError::UnsupportedDataType(
                data_type,
                $identifier.to_string(),
            )),
        }
    };
}

pub(crate) use dispatch_numeric;

/// Returns true if `data_type` has a numeric element type supported by [`dispatch_numeric`].
pub(crate) fn is_numeric(data_type: DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
