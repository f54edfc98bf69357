//! Compressors.
//!
//! A compressor is the final stage of a [`CodecChain`](super::CodecChain).
//! Each compressor requires a crate feature:
//!  - `gzip` (default): [`gzip`](self::gzip) and [`zlib`](self::zlib), implemented with [flate2],
//!  - `zstd` (default): [`zstd`](self::zstd),
//!  - `bz2`: [`bz2`](self::bz2).

#[cfg(feature = "bz2")]
pub mod bz2;
#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "gzip")]
pub mod zlib;
#[cfg(feature = "zstd")]
pub mod zstd;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A deflate compression level, an integer from 0 to 9.
///
/// Used by the `gzip` and `zlib` compressors.
#[derive(Serialize, Clone, Copy, Eq, PartialEq, Debug, Display)]
#[display("{_0}")]
pub struct DeflateCompressionLevel(u32);

/// An invalid deflate compression level.
#[derive(Debug, thiserror::Error)]
#[error("Invalid compression level {_0}, must be 0-9")]
pub struct DeflateCompressionLevelError(u32);

impl DeflateCompressionLevel {
    /// The maximum compression level.
    pub const MAX: u32 = 9;

    /// Returns the compression level as a [`u32`].
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DeflateCompressionLevel {
    type Error = DeflateCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level <= Self::MAX {
            Ok(Self(level))
        } else {
            Err(DeflateCompressionLevelError(level))
        }
    }
}

impl<'de> Deserialize<'de> for DeflateCompressionLevel {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let level = u32::deserialize(d)?;
        Self::try_from(level).map_err(serde::de::Error::custom)
    }
}
