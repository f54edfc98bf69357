//! Fill values.
//!
//! A [`FillValue`] provides the element value of uninitialised portions of an array.
//! Edge chunks are padded with it, and it is advertised in the `fill_value` field of `.zarray`.

use half::f16;
use num::ToPrimitive;
use thiserror::Error;

use crate::metadata::FillValueMetadataV2;

use super::{DataType, Endianness};

/// The fill value of a variable.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FillValue {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A complex number, real and imaginary components.
    Complex(f64, f64),
    /// A datetime or timedelta count. [`FillValue::NAT`] is not-a-time.
    DateTime(i64),
}

/// A fill value is incompatible with a data type.
#[derive(Debug, Error)]
#[error("fill value {_0:?} is incompatible with data type {_1}")]
pub struct IncompatibleFillValueError(FillValue, DataType);

impl IncompatibleFillValueError {
    /// Create a new incompatible fill value error.
    #[must_use]
    pub fn new(fill_value: FillValue, data_type: DataType) -> Self {
        Self(fill_value, data_type)
    }
}

macro_rules! endian_bytes {
    ( $value:expr, $endianness:expr ) => {
        match $endianness {
            Endianness::Little => $value.to_le_bytes().to_vec(),
            Endianness::Big => $value.to_be_bytes().to_vec(),
        }
    };
}

impl FillValue {
    /// The `numpy` NaT (not-a-time) sentinel of datetimes and timedeltas.
    pub const NAT: i64 = i64::MIN;

    /// Returns the fill value metadata.
    ///
    /// Non-finite floating point values become the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
    /// NaT is the integer `-9223372036854775808`.
    #[must_use]
    pub fn to_metadata(&self) -> FillValueMetadataV2 {
        match *self {
            Self::Bool(value) => FillValueMetadataV2::Bool(value),
            Self::Int(value) | Self::DateTime(value) => FillValueMetadataV2::Number(value.into()),
            Self::UInt(value) => FillValueMetadataV2::Number(value.into()),
            Self::Float(value) => FillValueMetadataV2::from_f64(value),
            Self::Complex(re, im) => FillValueMetadataV2::Complex(Box::new([
                FillValueMetadataV2::from_f64(re),
                FillValueMetadataV2::from_f64(im),
            ])),
        }
    }

    /// Returns true if the fill value can be represented by `data_type`.
    #[must_use]
    pub fn is_compatible(&self, data_type: DataType) -> bool {
        self.to_bytes(data_type, Endianness::Little).is_ok()
    }

    /// Encode the fill value as a single element of `data_type` with `endianness`.
    ///
    /// Integers must be in range of the data type.
    /// Floating point fill values are accepted by integer data types only if they are integral.
    ///
    /// # Errors
    /// Returns an [`IncompatibleFillValueError`] if the fill value cannot be represented by `data_type`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(
        &self,
        data_type: DataType,
        endianness: Endianness,
    ) -> Result<Vec<u8>, IncompatibleFillValueError> {
        let err = || IncompatibleFillValueError(*self, data_type);
        let bytes = match (*self, data_type) {
            (Self::Bool(value), DataType::Bool) => vec![u8::from(value)],
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Int8) => {
                vec![self.integral().and_then(|v| v.to_i8()).ok_or_else(err)?.to_ne_bytes()[0]]
            }
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Int16) => endian_bytes!(
                self.integral().and_then(|v| v.to_i16()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Int32) => endian_bytes!(
                self.integral().and_then(|v| v.to_i32()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Int64) => endian_bytes!(
                self.integral().and_then(|v| v.to_i64()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::UInt8) => {
                vec![self.integral().and_then(|v| v.to_u8()).ok_or_else(err)?]
            }
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::UInt16) => endian_bytes!(
                self.integral().and_then(|v| v.to_u16()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::UInt32) => endian_bytes!(
                self.integral().and_then(|v| v.to_u32()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::UInt64) => endian_bytes!(
                self.integral().and_then(|v| v.to_u64()).ok_or_else(err)?,
                endianness
            ),
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Float16) => {
                endian_bytes!(f16::from_f64(self.float().ok_or_else(err)?), endianness)
            }
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Float32) => {
                endian_bytes!(self.float().ok_or_else(err)? as f32, endianness)
            }
            (Self::Int(_) | Self::UInt(_) | Self::Float(_), DataType::Float64) => {
                endian_bytes!(self.float().ok_or_else(err)?, endianness)
            }
            (Self::Complex(re, im), DataType::Complex64) => {
                let mut bytes = endian_bytes!(re as f32, endianness);
                bytes.extend(endian_bytes!(im as f32, endianness));
                bytes
            }
            (Self::Complex(re, im), DataType::Complex128) => {
                let mut bytes = endian_bytes!(re, endianness);
                bytes.extend(endian_bytes!(im, endianness));
                bytes
            }
            (Self::Float(re), DataType::Complex64) => {
                let mut bytes = endian_bytes!(re as f32, endianness);
                bytes.extend(endian_bytes!(0.0f32, endianness));
                bytes
            }
            (Self::Float(re), DataType::Complex128) => {
                let mut bytes = endian_bytes!(re, endianness);
                bytes.extend(endian_bytes!(0.0f64, endianness));
                bytes
            }
            (Self::DateTime(value) | Self::Int(value), DataType::DateTime64(_) | DataType::TimeDelta64(_)) => {
                endian_bytes!(value, endianness)
            }
            _ => return Err(err()),
        };
        debug_assert_eq!(bytes.len(), data_type.size());
        Ok(bytes)
    }

    /// The fill value as an integer, if it is integral.
    fn integral(&self) -> Option<Integral> {
        match *self {
            Self::Int(value) => Some(Integral::Int(value)),
            Self::UInt(value) => Some(Integral::UInt(value)),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                Some(Integral::Float(value))
            }
            _ => None,
        }
    }

    /// The fill value as a floating point number.
    #[allow(clippy::cast_precision_loss)]
    fn float(&self) -> Option<f64> {
        match *self {
            Self::Int(value) => Some(value as f64),
            Self::UInt(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            _ => None,
        }
    }
}

/// An integral fill value, converted to a concrete integer type with range checks.
#[derive(Clone, Copy)]
enum Integral {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl ToPrimitive for Integral {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(value) => Some(value),
            Self::UInt(value) => value.to_i64(),
            Self::Float(value) => value.to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Self::Int(value) => value.to_u64(),
            Self::UInt(value) => Some(value),
            Self::Float(value) => value.to_u64(),
        }
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! from_fill_value {
    ( $variant:ident, $cast:ty, $( $t:ty ),* ) => {
        $(
            impl From<$t> for FillValue {
                fn from(value: $t) -> Self {
                    Self::$variant(<$cast>::from(value))
                }
            }
        )*
    };
}

from_fill_value!(Int, i64, i8, i16, i32, i64);
from_fill_value!(UInt, u64, u8, u16, u32, u64);
from_fill_value!(Float, f64, f32, f64);

impl From<f16> for FillValue {
    fn from(value: f16) -> Self {
        Self::Float(value.to_f64())
    }
}

impl From<num::complex::Complex32> for FillValue {
    fn from(value: num::complex::Complex32) -> Self {
        Self::Complex(f64::from(value.re), f64::from(value.im))
    }
}

impl From<num::complex::Complex64> for FillValue {
    fn from(value: num::complex::Complex64) -> Self {
        Self::Complex(value.re, value.im)
    }
}

#[cfg(test)]
mod tests {
    use crate::array::TimeUnit;

    use super::*;

    #[test]
    fn fill_value_metadata_nan() {
        let metadata = FillValue::Float(f64::NAN).to_metadata();
        assert_eq!(metadata, FillValueMetadataV2::NaN);
        assert_eq!(serde_json::to_string(&metadata).unwrap(), r#""NaN""#);
    }

    #[test]
    fn fill_value_metadata_nat() {
        let metadata = FillValue::DateTime(FillValue::NAT).to_metadata();
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            "-9223372036854775808"
        );
    }

    #[test]
    fn fill_value_metadata_complex() {
        let metadata = FillValue::Complex(f64::INFINITY, 2.0).to_metadata();
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"["Infinity",2.0]"#
        );
    }

    #[test]
    fn fill_value_bytes_int() {
        assert_eq!(
            FillValue::Int(-2).to_bytes(DataType::Int16, Endianness::Little).unwrap(),
            (-2i16).to_le_bytes().to_vec()
        );
        assert_eq!(
            FillValue::Int(258).to_bytes(DataType::UInt16, Endianness::Big).unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            FillValue::Float(3.0).to_bytes(DataType::Int8, Endianness::Little).unwrap(),
            vec![3]
        );
        assert!(FillValue::Int(-1).to_bytes(DataType::UInt8, Endianness::Little).is_err());
        assert!(FillValue::Int(300).to_bytes(DataType::Int8, Endianness::Little).is_err());
        assert!(FillValue::Float(0.5).to_bytes(DataType::Int32, Endianness::Little).is_err());
        assert!(FillValue::Float(f64::NAN).to_bytes(DataType::Int32, Endianness::Little).is_err());
    }

    #[test]
    fn fill_value_bytes_float() {
        assert_eq!(
            FillValue::Float(1.5).to_bytes(DataType::Float32, Endianness::Little).unwrap(),
            1.5f32.to_le_bytes().to_vec()
        );
        assert_eq!(
            FillValue::Int(2).to_bytes(DataType::Float64, Endianness::Big).unwrap(),
            2.0f64.to_be_bytes().to_vec()
        );
        let nan = FillValue::Float(f64::NAN)
            .to_bytes(DataType::Float16, Endianness::Little)
            .unwrap();
        assert!(f16::from_le_bytes([nan[0], nan[1]]).is_nan());
    }

    #[test]
    fn fill_value_bytes_complex_bool_time() {
        let bytes = FillValue::Complex(1.0, -1.0)
            .to_bytes(DataType::Complex64, Endianness::Little)
            .unwrap();
        assert_eq!(bytes[0..4], 1.0f32.to_le_bytes());
        assert_eq!(bytes[4..8], (-1.0f32).to_le_bytes());
        assert_eq!(
            FillValue::Bool(true).to_bytes(DataType::Bool, Endianness::Little).unwrap(),
            vec![1]
        );
        assert!(FillValue::Bool(true).to_bytes(DataType::Int8, Endianness::Little).is_err());
        assert_eq!(
            FillValue::DateTime(FillValue::NAT)
                .to_bytes(DataType::DateTime64(TimeUnit::Nanosecond), Endianness::Little)
                .unwrap(),
            i64::MIN.to_le_bytes().to_vec()
        );
        assert!(FillValue::DateTime(0).is_compatible(DataType::TimeDelta64(TimeUnit::Second)));
        assert!(!FillValue::DateTime(0).is_compatible(DataType::Float64));
    }

    #[test]
    fn fill_value_default_for_data_type() {
        assert_eq!(
            DataType::Float32.default_fill_value().to_metadata(),
            FillValueMetadataV2::NaN
        );
        assert_eq!(DataType::Int32.default_fill_value(), FillValue::Int(0));
        for data_type in [
            DataType::Bool,
            DataType::UInt64,
            DataType::Complex128,
            DataType::DateTime64(TimeUnit::Day),
        ] {
            assert!(data_type.default_fill_value().is_compatible(data_type));
        }
    }
}
