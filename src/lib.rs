//! A rust library for serving in-memory multidimensional datasets over HTTP as [Zarr V2](https://zarr.dev) with a cost-aware chunk cache.
//!
//! A [`Dataset`](dataset::Dataset) is a flat group of named [`Variable`](array::Variable)s with attributes and a stable identity.
//! [`ZarrService`](server::ZarrService) answers the four Zarr V2 requests a client makes against such a group:
//!  - `/.zmetadata`: consolidated metadata (ASCII JSON),
//!  - `/.zgroup` and `/.zattrs`: group metadata and attributes,
//!  - `/{var}/{key}`: `.zarray`/`.zattrs` of a variable, or an encoded chunk.
//!
//! Metadata and encoded chunks are cached in a [`CostAwareCache`](cache::CostAwareCache), which evicts cheap, large and stale entries first.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_serve::{
//!     array::{DataType, VariableBuilder},
//!     cache::CostAwareCache,
//!     dataset::Dataset,
//!     server::ZarrService,
//! };
//!
//! let elements: Vec<f32> = (0..100).map(|i| i as f32).collect();
//! let variable = VariableBuilder::new("air", vec![10, 10], DataType::Float32)
//!     .chunks(vec![5, 5])
//!     .dimension_names(["lat", "lon"])
//!     .build_from_elements(&elements)?;
//! let dataset = Dataset::builder().variable(variable).build()?;
//!
//! let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
//! let chunk = service.variable_chunk(&dataset, "air", "1.0")?;
//! assert_eq!(chunk.media_type(), "application/octet-stream");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: build variables from [`ndarray`] arrays.
//!  - Compressors: `gzip` (`gzip` and `zlib`), `zstd`.
//!
//! #### Non-Default
//!  - `bz2`: the `bz2` compressor.
//!  - `axum`: an [`axum`] router exposing a [`ZarrService`](server::ZarrService) for a dataset.
//!
//! ## Licence
//! `zarrs_serve` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod array_subset;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod metadata;
pub mod plugin;
pub mod server;
