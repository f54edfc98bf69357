//! The Zarr V2 request orchestrator.
//!
//! [`ZarrService`] answers the requests a Zarr V2 client makes against a [`Dataset`]:
//!
//! | Request        | Method                                          | Response                                  |
//! |----------------|-------------------------------------------------|-------------------------------------------|
//! | `/.zmetadata`  | [`zmetadata`](ZarrService::zmetadata)           | consolidated metadata                     |
//! | `/.zgroup`     | [`zgroup`](ZarrService::zgroup)                 | group metadata                            |
//! | `/.zattrs`     | [`zattrs`](ZarrService::zattrs)                 | group attributes                          |
//! | `/{var}/{key}` | [`variable_chunk`](ZarrService::variable_chunk) | `.zarray`, `.zattrs`, or an encoded chunk |
//!
//! Derived metadata and encoded chunks are cached in a [`CostCache`] under keys namespaced by the [dataset identity](Dataset::identity).
//!
//! The `axum` feature adds [`router`], which serves a dataset over HTTP.

#[cfg(feature = "axum")]
mod axum_router;
mod zarr_key;

#[cfg(feature = "axum")]
pub use axum_router::router;
pub use zarr_key::ZarrKey;

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use thiserror::Error;

use crate::{
    array::{
        chunk_grid::chunk_key,
        codec::{encode_chunk, CodecError},
        ArrayDataError, ChunkKeyError, IncompatibleFillValueError, RegularChunkGrid, Variable,
    },
    array_subset::{ArrayStoreBytesError, ArraySubset},
    cache::{CostCache, CostTimer},
    config::global_config,
    dataset::{Dataset, DatasetMetadata, VariableMetadata, CONSOLIDATED_METADATA_KEY},
    metadata::to_ascii_json_vec,
};

/// The media type of JSON responses.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The media type of chunk responses.
pub const CHUNK_MEDIA_TYPE: &str = "application/octet-stream";

/// A value cached by a [`ZarrService`].
#[derive(Debug, Clone)]
pub enum ZarrCacheValue {
    /// The metadata of a dataset.
    Metadata {
        /// The derived metadata.
        metadata: Arc<DatasetMetadata>,
        /// The consolidated metadata document as ASCII JSON.
        zmetadata: Bytes,
    },
    /// An encoded chunk.
    Chunk(Bytes),
}

/// A response of a [`ZarrService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZarrResponse {
    /// An ASCII JSON document.
    Json(Bytes),
    /// An encoded chunk.
    Chunk(Bytes),
}

impl ZarrResponse {
    /// Return the media type of the response.
    #[must_use]
    pub const fn media_type(&self) -> &'static str {
        match self {
            Self::Json(_) => JSON_MEDIA_TYPE,
            Self::Chunk(_) => CHUNK_MEDIA_TYPE,
        }
    }

    /// Return the body of the response.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        match self {
            Self::Json(body) | Self::Chunk(body) => body,
        }
    }

    /// Convert into the body of the response.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        match self {
            Self::Json(body) | Self::Chunk(body) => body,
        }
    }

    fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, ZarrServiceError> {
        Ok(Self::Json(to_ascii_json_vec(value)?.into()))
    }
}

/// A [`ZarrService`] error.
#[derive(Debug, Error)]
pub enum ZarrServiceError {
    /// Group metadata was requested below the root of a dataset.
    #[error("No subgroups")]
    NoSubgroups,
    /// The dataset has no variable with the requested name.
    #[error("variable {_0:?} not found")]
    VariableNotFound(String),
    /// The chunk key is malformed or outside of the chunk grid.
    #[error(transparent)]
    ChunkKeyError(#[from] ChunkKeyError),
    /// The array data could not be read.
    #[error(transparent)]
    ArrayDataError(#[from] ArrayDataError),
    /// The chunk could not be encoded.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// The fill value could not be encoded.
    #[error(transparent)]
    IncompatibleFillValue(#[from] IncompatibleFillValueError),
    /// A partial chunk could not be padded.
    #[error(transparent)]
    StoreBytesError(#[from] ArrayStoreBytesError),
    /// A metadata document could not be serialised.
    #[error(transparent)]
    MetadataError(#[from] serde_json::Error),
}

impl ZarrServiceError {
    /// Return the HTTP status code of the error.
    ///
    /// - `404` if the requested document does not exist,
    /// - `400` if the chunk key is invalid,
    /// - `500` otherwise.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoSubgroups | Self::VariableNotFound(_) => 404,
            Self::ChunkKeyError(_) => 400,
            Self::ArrayDataError(_)
            | Self::CodecError(_)
            | Self::IncompatibleFillValue(_)
            | Self::StoreBytesError(_)
            | Self::MetadataError(_) => 500,
        }
    }
}

/// Serves the Zarr V2 metadata and chunks of datasets.
///
/// The service owns a handle to a [`CostCache`], which may be shared with other services.
#[derive(Clone)]
pub struct ZarrService {
    cache: Arc<dyn CostCache<ZarrCacheValue>>,
    pad_partial_chunks: bool,
}

impl core::fmt::Debug for ZarrService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ZarrService")
            .field("cache_len", &self.cache.len())
            .field("pad_partial_chunks", &self.pad_partial_chunks)
            .finish()
    }
}

impl ZarrService {
    /// Create a new service caching in `cache`.
    ///
    /// Partial chunks are padded according to the [pad partial chunks](crate::config::Config#pad-partial-chunks) configuration.
    #[must_use]
    pub fn new<C: CostCache<ZarrCacheValue> + 'static>(cache: Arc<C>) -> Self {
        Self {
            cache,
            pad_partial_chunks: global_config().pad_partial_chunks(),
        }
    }

    /// Return the cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CostCache<ZarrCacheValue>> {
        &self.cache
    }

    /// Returns true if partial chunks are padded to the chunk shape with the fill value.
    #[must_use]
    pub const fn pad_partial_chunks(&self) -> bool {
        self.pad_partial_chunks
    }

    /// Set whether partial chunks are padded to the chunk shape with the fill value.
    pub fn set_pad_partial_chunks(&mut self, pad_partial_chunks: bool) -> &mut Self {
        self.pad_partial_chunks = pad_partial_chunks;
        self
    }

    /// Return the metadata of `dataset`, deriving it on a cache miss.
    ///
    /// # Errors
    /// Returns [`ZarrServiceError::MetadataError`] if the metadata cannot be serialised.
    pub fn dataset_metadata(
        &self,
        dataset: &Dataset,
    ) -> Result<Arc<DatasetMetadata>, ZarrServiceError> {
        Ok(self.cached_metadata(dataset)?.0)
    }

    /// Return the metadata of `dataset` and its serialised consolidated metadata.
    fn cached_metadata(
        &self,
        dataset: &Dataset,
    ) -> Result<(Arc<DatasetMetadata>, Bytes), ZarrServiceError> {
        let cache_key = format!("{}/{CONSOLIDATED_METADATA_KEY}", dataset.identity());
        if let Some(ZarrCacheValue::Metadata {
            metadata,
            zmetadata,
        }) = self.cache.get(&cache_key)
        {
            return Ok((metadata, zmetadata));
        }

        let mut cost = Duration::ZERO;
        let (metadata, zmetadata) = {
            let _timer = CostTimer::start(&mut cost);
            let metadata = DatasetMetadata::derive(dataset);
            let zmetadata = Bytes::from(to_ascii_json_vec(&metadata.jsonify()?)?);
            (Arc::new(metadata), zmetadata)
        };
        self.cache.put(
            cache_key,
            ZarrCacheValue::Metadata {
                metadata: metadata.clone(),
                zmetadata: zmetadata.clone(),
            },
            cost,
            zmetadata.len() as u64,
        );
        Ok((metadata, zmetadata))
    }

    /// Return the consolidated metadata (`/.zmetadata`) of `dataset`.
    ///
    /// # Errors
    /// Returns [`ZarrServiceError::MetadataError`] if the metadata cannot be serialised.
    pub fn zmetadata(&self, dataset: &Dataset) -> Result<ZarrResponse, ZarrServiceError> {
        let (_, zmetadata) = self.cached_metadata(dataset)?;
        Ok(ZarrResponse::Json(zmetadata))
    }

    /// Return the group metadata (`/.zgroup`) of `dataset`.
    ///
    /// # Errors
    /// Returns [`ZarrServiceError::MetadataError`] if the metadata cannot be serialised.
    pub fn zgroup(&self, dataset: &Dataset) -> Result<ZarrResponse, ZarrServiceError> {
        let metadata = self.dataset_metadata(dataset)?;
        ZarrResponse::json(&metadata.group_metadata())
    }

    /// Return the group attributes (`/.zattrs`) of `dataset`.
    ///
    /// # Errors
    /// Returns [`ZarrServiceError::MetadataError`] if the metadata cannot be serialised.
    pub fn zattrs(&self, dataset: &Dataset) -> Result<ZarrResponse, ZarrServiceError> {
        let metadata = self.dataset_metadata(dataset)?;
        ZarrResponse::json(&metadata.group_attributes())
    }

    /// Return the response to `/{var}/{key}` of `dataset`.
    ///
    /// The response is the `.zarray` or `.zattrs` document of the variable if `key` is one of those, otherwise `key` is a chunk key and the response is the encoded chunk.
    ///
    /// # Errors
    /// Returns a [`ZarrServiceError`] if
    ///  - `var` is not a variable of the dataset,
    ///  - `key` is `.zgroup`,
    ///  - `key` is not a valid chunk key of the variable, or
    ///  - the chunk cannot be read or encoded.
    pub fn variable_chunk(
        &self,
        dataset: &Dataset,
        var: &str,
        key: &str,
    ) -> Result<ZarrResponse, ZarrServiceError> {
        let zarr_key = ZarrKey::classify(key);
        if zarr_key == ZarrKey::GroupMeta {
            return Err(ZarrServiceError::NoSubgroups);
        }
        let metadata = self.dataset_metadata(dataset)?;
        let variable_metadata = metadata
            .variable(var)
            .ok_or_else(|| ZarrServiceError::VariableNotFound(var.to_string()))?;
        match zarr_key {
            ZarrKey::ArrayMeta => ZarrResponse::json(&variable_metadata.array_metadata()),
            ZarrKey::Attrs => ZarrResponse::json(&variable_metadata.attributes()),
            ZarrKey::GroupMeta => Err(ZarrServiceError::NoSubgroups),
            ZarrKey::ChunkCoord(chunk) => {
                log::debug!("var is {var}");
                log::debug!("chunk is {chunk}");
                let variable = dataset
                    .variable(var)
                    .ok_or_else(|| ZarrServiceError::VariableNotFound(var.to_string()))?;
                let chunk = self.chunk(dataset.identity(), variable, variable_metadata, chunk)?;
                Ok(ZarrResponse::Chunk(chunk))
            }
        }
    }

    /// Return the encoded chunk with `chunk_key` of `variable`, encoding it on a cache miss.
    fn chunk(
        &self,
        identity: &str,
        variable: &Variable,
        metadata: &VariableMetadata,
        chunk_key_str: &str,
    ) -> Result<Bytes, ZarrServiceError> {
        let chunk_grid = RegularChunkGrid::new(metadata.chunk_shape().clone());
        let (chunk_indices, chunk_subset) = chunk_grid.locate(chunk_key_str, metadata.shape())?;
        let cache_key = format!("{identity}/{}/{}", metadata.name(), chunk_key(&chunk_indices));
        if let Some(ZarrCacheValue::Chunk(bytes)) = self.cache.get(&cache_key) {
            return Ok(bytes);
        }

        let mut cost = Duration::ZERO;
        let encoded = {
            let _timer = CostTimer::start(&mut cost);
            let bytes = variable.read_subset(&chunk_subset)?;
            let bytes = if self.pad_partial_chunks {
                pad_chunk(metadata, &chunk_subset, bytes)?
            } else {
                bytes
            };
            Bytes::from(encode_chunk(
                bytes,
                metadata.filters(),
                metadata.compressor(),
            )?)
        };
        self.cache.put(
            cache_key,
            ZarrCacheValue::Chunk(encoded.clone()),
            cost,
            encoded.len() as u64,
        );
        Ok(encoded)
    }
}

/// Place the `bytes` of a chunk subset truncated by the array bounds into a chunk initialised with the fill value.
fn pad_chunk(
    metadata: &VariableMetadata,
    chunk_subset: &ArraySubset,
    bytes: Vec<u8>,
) -> Result<Vec<u8>, ZarrServiceError> {
    let chunk_shape = metadata.chunk_shape().to_array_shape();
    if chunk_subset.shape() == chunk_shape.as_slice() {
        return Ok(bytes);
    }
    let element_size = metadata.data_type().size();
    let fill_value = match metadata.fill_value() {
        Some(fill_value) => fill_value.to_bytes(metadata.data_type(), metadata.endianness())?,
        None => vec![0; element_size],
    };
    let mut chunk_bytes =
        fill_value.repeat(ArraySubset::new_with_shape(chunk_shape.clone()).num_elements_usize());
    ArraySubset::new_with_shape(chunk_subset.shape().to_vec()).store_bytes(
        &bytes,
        &mut chunk_bytes,
        &chunk_shape,
        element_size,
    )?;
    Ok(chunk_bytes)
}

#[cfg(test)]
mod tests {
    use crate::{
        array::{DataType, FillValue, VariableBuilder},
        cache::CostAwareCache,
        metadata::MetadataV2,
    };

    use super::*;

    fn dataset() -> Dataset {
        let elements: Vec<u16> = (0..35).collect();
        let variable = VariableBuilder::new("v", vec![5, 7], DataType::UInt16)
            .chunks(vec![2, 4])
            .fill_value(FillValue::UInt(9))
            .build_from_elements(&elements)
            .unwrap();
        Dataset::builder().variable(variable).build().unwrap()
    }

    fn u16s(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn zarr_service_partial_chunk_padded() {
        let dataset = dataset();
        let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
        assert!(service.pad_partial_chunks());
        let chunk = service.variable_chunk(&dataset, "v", "2.1").unwrap();
        assert_eq!(chunk.media_type(), CHUNK_MEDIA_TYPE);
        assert_eq!(u16s(chunk.body()), [32, 33, 34, 9, 9, 9, 9, 9]);
    }

    #[test]
    fn zarr_service_partial_chunk_truncated() {
        let dataset = dataset();
        let mut service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
        service.set_pad_partial_chunks(false);
        let chunk = service.variable_chunk(&dataset, "v", "2.1").unwrap();
        assert_eq!(u16s(chunk.body()), [32, 33, 34]);
        let chunk = service.variable_chunk(&dataset, "v", "0.0").unwrap();
        assert_eq!(u16s(chunk.body()), [0, 1, 2, 3, 7, 8, 9, 10]);
    }

    #[test]
    fn zarr_service_null_fill_value_pads_zeros() {
        let variable = VariableBuilder::new("v", vec![3], DataType::Int8)
            .chunks(vec![2])
            .no_fill_value()
            .build_from_elements(&[1i8, 2, 3])
            .unwrap();
        let dataset = Dataset::builder().variable(variable).build().unwrap();
        let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
        let chunk = service.variable_chunk(&dataset, "v", "1").unwrap();
        assert_eq!(chunk.body()[..], [3, 0]);
    }

    #[test]
    fn zarr_service_canonical_chunk_cache_key() {
        let dataset = dataset();
        let cache = Arc::new(CostAwareCache::new(1_000_000));
        let service = ZarrService::new(cache.clone());
        let a = service.variable_chunk(&dataset, "v", "01.1").unwrap();
        let b = service.variable_chunk(&dataset, "v", "1.1").unwrap();
        assert_eq!(a, b);
        assert!(cache.contains_key(&format!("{}/v/1.1", dataset.identity())));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zarr_service_errors() {
        let dataset = dataset();
        let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
        let err = service.variable_chunk(&dataset, "v", ".zgroup").unwrap_err();
        assert!(matches!(err, ZarrServiceError::NoSubgroups));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "No subgroups");
        let err = service.variable_chunk(&dataset, "w", ".zgroup").unwrap_err();
        assert!(matches!(err, ZarrServiceError::NoSubgroups));
        assert_eq!(err.status_code(), 404);

        let err = service.variable_chunk(&dataset, "w", "0.0").unwrap_err();
        assert!(matches!(err, ZarrServiceError::VariableNotFound(_)));
        assert_eq!(err.status_code(), 404);

        for key in ["3.0", "0", "0.0.0", "a.b", "-1.0"] {
            let err = service.variable_chunk(&dataset, "v", key).unwrap_err();
            assert!(matches!(err, ZarrServiceError::ChunkKeyError(_)), "{key}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn zarr_service_zmetadata_served_from_cache() {
        let dataset = dataset();
        let cache = Arc::new(CostAwareCache::new(1_000_000));
        let service = ZarrService::new(cache.clone());
        let first = service.zmetadata(&dataset).unwrap();
        let second = service.zmetadata(&dataset).unwrap();
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        let Some(ZarrCacheValue::Metadata { zmetadata, .. }) =
            cache.get(&format!("{}/.zmetadata", dataset.identity()))
        else {
            panic!("metadata is not cached");
        };
        assert_eq!(zmetadata, second.into_body());
        assert_eq!(
            cache.total_bytes(),
            zmetadata.len() as u64,
            "the metadata entry is sized by its consolidated document"
        );
    }

    #[test]
    fn zarr_service_encoding_failure() {
        // The filter configuration is valid but its data type does not match the chunk
        let variable = VariableBuilder::new("v", vec![3], DataType::UInt8)
            .filters(vec![serde_json::from_str::<MetadataV2>(
                r#"{"id": "delta", "dtype": "<i8"}"#,
            )
            .unwrap()])
            .build_from_elements(&[1u8, 2, 3])
            .unwrap();
        let dataset = Dataset::builder().variable(variable).build().unwrap();
        let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
        let err = service.variable_chunk(&dataset, "v", "0").unwrap_err();
        assert!(matches!(err, ZarrServiceError::CodecError(_)));
        assert_eq!(err.status_code(), 500);
    }
}
