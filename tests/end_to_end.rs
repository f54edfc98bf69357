use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use zarrs_serve::{
    array::{codec::CodecChain, ArrayDataError, ComputedArrayData, DataType, VariableBuilder},
    array_subset::ArraySubset,
    cache::{CostAwareCache, CostCache},
    dataset::Dataset,
    metadata::MetadataV2,
    server::{ZarrCacheValue, ZarrResponse, ZarrService, ZarrServiceError},
};

fn air() -> Result<Dataset, Box<dyn Error>> {
    env_logger::try_init().ok();
    let elements: Vec<f32> = (0..100u8).map(f32::from).collect();
    let variable = VariableBuilder::new("air", vec![10, 10], DataType::Float32)
        .chunks(vec![5, 5])
        .dimension_names(["lat", "lon"])
        .build_from_elements(&elements)?;
    Ok(Dataset::builder().variable(variable).build()?)
}

fn f32s(response: &ZarrResponse) -> Vec<f32> {
    response
        .body()
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes(b.try_into().unwrap()))
        .collect()
}

fn expected(rows: std::ops::Range<u8>, cols: std::ops::Range<u8>) -> Vec<f32> {
    rows.flat_map(|r| cols.clone().map(move |c| f32::from(r * 10 + c)))
        .collect()
}

#[test]
fn end_to_end_chunks() -> Result<(), Box<dyn Error>> {
    let dataset = air()?;
    let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));

    let chunk = service.variable_chunk(&dataset, "air", "0.0")?;
    assert_eq!(chunk.media_type(), "application/octet-stream");
    assert_eq!(f32s(&chunk), expected(0..5, 0..5));

    let chunk = service.variable_chunk(&dataset, "air", "1.1")?;
    assert_eq!(f32s(&chunk), expected(5..10, 5..10));

    let err = service
        .variable_chunk(&dataset, "air", "2.0")
        .unwrap_err();
    assert!(matches!(err, ZarrServiceError::ChunkKeyError(_)));
    assert_eq!(err.status_code(), 400);
    Ok(())
}

#[test]
fn end_to_end_zarray() -> Result<(), Box<dyn Error>> {
    let dataset = air()?;
    let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
    let zarray = service.variable_chunk(&dataset, "air", ".zarray")?;
    assert_eq!(zarray.media_type(), "application/json");
    let zarray: serde_json::Value = serde_json::from_slice(zarray.body())?;
    assert_eq!(zarray["chunks"], serde_json::json!([5, 5]));
    assert_eq!(zarray["shape"], serde_json::json!([10, 10]));
    assert_eq!(zarray["fill_value"], "NaN");
    assert_eq!(zarray["zarr_format"], 2);

    let zattrs = service.variable_chunk(&dataset, "air", ".zattrs")?;
    assert_eq!(
        zattrs.body().as_ref(),
        br#"{"_ARRAY_DIMENSIONS":["lat","lon"]}"#
    );
    Ok(())
}

#[test]
fn end_to_end_zgroup_cached() -> Result<(), Box<dyn Error>> {
    let dataset = air()?;
    let cache = Arc::new(CostAwareCache::new(1_000_000));
    let service = ZarrService::new(cache.clone());

    let first = service.zgroup(&dataset)?;
    assert_eq!((cache.hits(), cache.misses()), (0, 1));
    let second = service.zgroup(&dataset)?;
    assert_eq!((cache.hits(), cache.misses()), (1, 1));
    assert_eq!(first, second);
    assert_eq!(first.body().as_ref(), br#"{"zarr_format":2}"#);

    let zattrs = service.zattrs(&dataset)?;
    assert_eq!(zattrs.body().as_ref(), b"{}");
    assert_eq!(cache.misses(), 1);
    Ok(())
}

#[test]
fn end_to_end_zmetadata() -> Result<(), Box<dyn Error>> {
    let dataset = air()?;
    let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));
    let a = service.zmetadata(&dataset)?;
    let b = service.zmetadata(&dataset)?;
    assert_eq!(a, b);
    assert!(a.body().is_ascii());
    let zmetadata: serde_json::Value = serde_json::from_slice(a.body())?;
    assert_eq!(zmetadata["zarr_consolidated_format"], 1);
    let documents = zmetadata["metadata"].as_object().unwrap();
    assert_eq!(
        documents.keys().collect::<Vec<_>>(),
        [".zgroup", ".zattrs", "air/.zarray", "air/.zattrs"]
    );
    Ok(())
}

#[test]
fn end_to_end_identity_namespaces_cache() -> Result<(), Box<dyn Error>> {
    let cache = Arc::new(CostAwareCache::new(1_000_000));
    let service = ZarrService::new(cache.clone());
    let a = air()?;
    let b = air()?;
    service.zgroup(&a)?;
    service.zgroup(&b)?;
    assert_eq!(cache.misses(), 2);
    assert!(matches!(
        cache.get(&format!("{}/.zmetadata", a.identity())),
        Some(ZarrCacheValue::Metadata { .. })
    ));
    Ok(())
}

#[test]
fn end_to_end_computed_chunks_cached() -> Result<(), Box<dyn Error>> {
    let reads = Arc::new(AtomicUsize::new(0));
    let data = ComputedArrayData::new(vec![8, 8], 8, {
        let reads = reads.clone();
        move |subset: &ArraySubset| -> Result<Vec<u8>, ArrayDataError> {
            reads.fetch_add(1, Ordering::SeqCst);
            let elements: Vec<i64> = subset
                .iter_indices()
                .map(|indices| (indices[0] * 8 + indices[1]) as i64)
                .collect();
            Ok(elements.iter().flat_map(|e| e.to_ne_bytes()).collect())
        }
    });
    let compressor: Option<MetadataV2> = if cfg!(feature = "zstd") {
        Some(serde_json::from_str(r#"{"id": "zstd", "level": 1}"#)?)
    } else {
        None
    };
    let filters: Vec<MetadataV2> = vec![serde_json::from_str(&format!(
        r#"{{"id": "delta", "dtype": "{}i8"}}"#,
        if cfg!(target_endian = "little") { "<" } else { ">" }
    ))?];
    let variable = VariableBuilder::new("index", vec![8, 8], DataType::Int64)
        .chunks(vec![4, 4])
        .compressor(compressor.clone())
        .filters(filters.clone())
        .build(Arc::new(data))?;
    let dataset = Dataset::builder().variable(variable).build()?;
    let service = ZarrService::new(Arc::new(CostAwareCache::new(1_000_000)));

    let a = service.variable_chunk(&dataset, "index", "1.0")?;
    let b = service.variable_chunk(&dataset, "index", "1.0")?;
    assert_eq!(a, b);
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    let decoded = CodecChain::from_metadata(&filters, compressor.as_ref())?
        .decode(a.into_body().to_vec())?;
    let decoded: Vec<i64> = decoded
        .chunks_exact(8)
        .map(|b| i64::from_ne_bytes(b.try_into().unwrap()))
        .collect();
    let expected: Vec<i64> = (4..8)
        .flat_map(|r| (0..4).map(move |c| r * 8 + c))
        .collect();
    assert_eq!(decoded, expected);
    Ok(())
}

#[test]
fn end_to_end_concurrent_requests() -> Result<(), Box<dyn Error>> {
    let dataset = air()?;
    let cache = Arc::new(CostAwareCache::new(1_000));
    let service = ZarrService::new(cache.clone());
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    for key in ["0.0", "0.1", "1.0", "1.1"] {
                        let chunk = service.variable_chunk(&dataset, "air", key).unwrap();
                        assert_eq!(chunk.body().len(), 100);
                    }
                }
            });
        }
    });
    assert!(cache.total_bytes() <= 1_000);
    Ok(())
}
