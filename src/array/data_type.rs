//! Array data types.
//!
//! A [`DataType`] is the element type of a [`Variable`](crate::array::Variable).
//! In Zarr V2 metadata a data type is encoded as a `numpy` type string, a byte order character followed by a type code and item size:
//!  - `|b1`, `|i1`, `|u1` for single byte types (byte order is irrelevant),
//!  - `<i4`, `>u8`, `<f8`, `<c16`, ... for multi-byte types,
//!  - `<M8[ns]`, `<m8[s]`, ... for datetimes and timedeltas with a [`TimeUnit`].

use derive_more::{Display, From};
use thiserror::Error;

use super::{Endianness, FillValue, NATIVE_ENDIAN};

/// The unit of a datetime or timedelta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum TimeUnit {
    /// Days.
    #[display("D")]
    Day,
    /// Hours.
    #[display("h")]
    Hour,
    /// Minutes.
    #[display("m")]
    Minute,
    /// Seconds.
    #[display("s")]
    Second,
    /// Milliseconds.
    #[display("ms")]
    Millisecond,
    /// Microseconds.
    #[display("us")]
    Microsecond,
    /// Nanoseconds.
    #[display("ns")]
    Nanosecond,
}

impl std::str::FromStr for TimeUnit {
    type Err = UnsupportedDataTypeError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "D" => Ok(Self::Day),
            "h" => Ok(Self::Hour),
            "m" => Ok(Self::Minute),
            "s" => Ok(Self::Second),
            "ms" => Ok(Self::Millisecond),
            "us" => Ok(Self::Microsecond),
            "ns" => Ok(Self::Nanosecond),
            _ => Err(UnsupportedDataTypeError(unit.to_string())),
        }
    }
}

/// A data type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[rustfmt::skip]
pub enum DataType {
    /// `bool` Boolean.
    #[display("bool")]
    Bool,
    /// `int8` Integer in `[-2^7, 2^7-1]`.
    #[display("int8")]
    Int8,
    /// `int16` Integer in `[-2^15, 2^15-1]`.
    #[display("int16")]
    Int16,
    /// `int32` Integer in `[-2^31, 2^31-1]`.
    #[display("int32")]
    Int32,
    /// `int64` Integer in `[-2^63, 2^63-1]`.
    #[display("int64")]
    Int64,
    /// `uint8` Integer in `[0, 2^8-1]`.
    #[display("uint8")]
    UInt8,
    /// `uint16` Integer in `[0, 2^16-1]`.
    #[display("uint16")]
    UInt16,
    /// `uint32` Integer in `[0, 2^32-1]`.
    #[display("uint32")]
    UInt32,
    /// `uint64` Integer in `[0, 2^64-1]`.
    #[display("uint64")]
    UInt64,
    /// `float16` IEEE 754 half-precision floating point: sign bit, 5 bits exponent, 10 bits mantissa.
    #[display("float16")]
    Float16,
    /// `float32` IEEE 754 single-precision floating point: sign bit, 8 bits exponent, 23 bits mantissa.
    #[display("float32")]
    Float32,
    /// `float64` IEEE 754 double-precision floating point: sign bit, 11 bits exponent, 52 bits mantissa.
    #[display("float64")]
    Float64,
    /// `complex64` real and complex components are each IEEE 754 single-precision floating point.
    #[display("complex64")]
    Complex64,
    /// `complex128` real and complex components are each IEEE 754 double-precision floating point.
    #[display("complex128")]
    Complex128,
    /// `datetime64` a signed 64-bit count of [`TimeUnit`]s since the unix epoch. `i64::MIN` is NaT (not-a-time).
    #[display("datetime64[{_0}]")]
    DateTime64(TimeUnit),
    /// `timedelta64` a signed 64-bit count of [`TimeUnit`]s. `i64::MIN` is NaT (not-a-time).
    #[display("timedelta64[{_0}]")]
    TimeDelta64(TimeUnit),
}

/// An unsupported data type error.
#[derive(Debug, Error, From)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// Returns the size in bytes of an element.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64
            | Self::UInt64
            | Self::Float64
            | Self::Complex64
            | Self::DateTime64(_)
            | Self::TimeDelta64(_) => 8,
            Self::Complex128 => 16,
        }
    }

    /// Returns the `numpy` kind character of the data type.
    #[must_use]
    pub const fn kind(self) -> char {
        match self {
            Self::Bool => 'b',
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => 'i',
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => 'u',
            Self::Float16 | Self::Float32 | Self::Float64 => 'f',
            Self::Complex64 | Self::Complex128 => 'c',
            Self::DateTime64(_) => 'M',
            Self::TimeDelta64(_) => 'm',
        }
    }

    /// Returns the Zarr V2 data type string for elements with `endianness`, e.g. `<f8`.
    ///
    /// Single byte data types are always prefixed with `|`.
    #[must_use]
    pub fn to_dtype_v2(self, endianness: Endianness) -> String {
        let prefix = if self.size() == 1 {
            '|'
        } else {
            endianness.v2_prefix()
        };
        match self {
            Self::DateTime64(unit) | Self::TimeDelta64(unit) => {
                format!("{prefix}{}8[{unit}]", self.kind())
            }
            _ => format!("{prefix}{}{}", self.kind(), self.size()),
        }
    }

    /// Parse a Zarr V2 data type string, returning the data type and the endianness of its elements.
    ///
    /// The `|` and `=` byte order characters resolve to the native endianness.
    ///
    /// # Errors
    /// Returns an [`UnsupportedDataTypeError`] if `dtype` is not a supported data type.
    pub fn from_dtype_v2(dtype: &str) -> Result<(Self, Endianness), UnsupportedDataTypeError> {
        let err = || UnsupportedDataTypeError(dtype.to_string());
        let mut chars = dtype.chars();
        let endianness = match chars.next() {
            Some('<') => Endianness::Little,
            Some('>') => Endianness::Big,
            Some('|' | '=') => NATIVE_ENDIAN,
            _ => return Err(err()),
        };
        let kind = chars.next().ok_or_else(err)?;
        let rest = chars.as_str();
        let data_type = match (kind, rest) {
            ('b', "1") => Self::Bool,
            ('i', "1") => Self::Int8,
            ('i', "2") => Self::Int16,
            ('i', "4") => Self::Int32,
            ('i', "8") => Self::Int64,
            ('u', "1") => Self::UInt8,
            ('u', "2") => Self::UInt16,
            ('u', "4") => Self::UInt32,
            ('u', "8") => Self::UInt64,
            ('f', "2") => Self::Float16,
            ('f', "4") => Self::Float32,
            ('f', "8") => Self::Float64,
            ('c', "8") => Self::Complex64,
            ('c', "16") => Self::Complex128,
            ('M' | 'm', rest) => {
                let unit = rest
                    .strip_prefix("8[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(err)?
                    .parse::<TimeUnit>()
                    .map_err(|_| err())?;
                if kind == 'M' {
                    Self::DateTime64(unit)
                } else {
                    Self::TimeDelta64(unit)
                }
            }
            _ => return Err(err()),
        };
        Ok((data_type, endianness))
    }

    /// Returns the fill value used when a variable does not declare one.
    ///
    /// This is `NaN` for floating point and complex data types, NaT for datetimes and timedeltas, zero for integers, and `false` for booleans.
    #[must_use]
    pub const fn default_fill_value(self) -> FillValue {
        match self {
            Self::Bool => FillValue::Bool(false),
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => FillValue::Int(0),
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => FillValue::UInt(0),
            Self::Float16 | Self::Float32 | Self::Float64 => FillValue::Float(f64::NAN),
            Self::Complex64 | Self::Complex128 => FillValue::Complex(f64::NAN, f64::NAN),
            Self::DateTime64(_) | Self::TimeDelta64(_) => FillValue::DateTime(FillValue::NAT),
        }
    }
}
