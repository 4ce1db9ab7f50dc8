//! Snapshot blob encoding
//!
//! Plain blobs are the store serialized as JSON. Compressed blobs carry a
//! five-byte header (`MAGIC` followed by an algorithm tag) ahead of the
//! compressed JSON. JSON always starts with `{`, so the two never collide.

use crate::store::MetricStore;
use crate::{Error, Result};

const MAGIC: &[u8] = b"TMSZ";

#[cfg(feature = "compression")]
const HEADER_LEN: usize = 5;

/// Compression algorithm for snapshot blobs
#[cfg(feature = "compression")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// LZ4 - Fast compression (default)
    #[default]
    Lz4,
    /// ZSTD - Better ratio, slower
    Zstd,
}

#[cfg(feature = "compression")]
impl Compression {
    /// Get algorithm name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Lz4 => 1,
            Self::Zstd => 2,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Lz4),
            2 => Ok(Self::Zstd),
            other => Err(Error::Snapshot(format!("unknown compression tag {other}"))),
        }
    }

    fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            Self::Zstd => zstd::encode_all(data, 3)
                .map_err(|e| Error::Snapshot(format!("ZSTD compression failed: {e}"))),
        }
    }

    fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::Snapshot(format!("LZ4 decompression failed: {e}"))),
            Self::Zstd => zstd::decode_all(data)
                .map_err(|e| Error::Snapshot(format!("ZSTD decompression failed: {e}"))),
        }
    }
}

#[cfg(feature = "compression")]
pub(super) fn encode(store: &MetricStore, compression: Option<Compression>) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(store)?;
    let Some(compression) = compression else {
        return Ok(json);
    };

    let compressed = compression.compress(&json)?;
    let mut blob = Vec::with_capacity(HEADER_LEN + compressed.len());
    blob.extend_from_slice(MAGIC);
    blob.push(compression.tag());
    blob.extend_from_slice(&compressed);
    Ok(blob)
}

#[cfg(not(feature = "compression"))]
pub(super) fn encode(store: &MetricStore) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(store)?)
}

pub(super) fn decode(blob: &[u8]) -> Result<MetricStore> {
    if !blob.starts_with(MAGIC) {
        return Ok(serde_json::from_slice(blob)?);
    }

    let json = decompress(blob)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(feature = "compression")]
fn decompress(blob: &[u8]) -> Result<Vec<u8>> {
    let tag = blob
        .get(MAGIC.len())
        .copied()
        .ok_or_else(|| Error::Snapshot("truncated compressed snapshot header".to_string()))?;
    Compression::from_tag(tag)?.decompress(&blob[HEADER_LEN..])
}

#[cfg(not(feature = "compression"))]
fn decompress(_blob: &[u8]) -> Result<Vec<u8>> {
    Err(Error::Snapshot(
        "snapshot is compressed; rebuild with the `compression` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MetricStore {
        let mut store = MetricStore::new("codec");
        store.add_metric("loss", 0.125);
        store.add_metric("loss", 0.1);
        store.advance_trial();
        store.add_metric("loss", 0.05);
        store
    }

    #[cfg(not(feature = "compression"))]
    #[test]
    fn test_plain_blob_is_json() {
        let original = store();
        let blob = encode(&original).unwrap();
        assert_eq!(blob.first(), Some(&b'{'));
        assert_eq!(decode(&blob).unwrap(), original);
    }

    #[cfg(not(feature = "compression"))]
    #[test]
    fn test_compressed_blob_needs_feature() {
        let mut blob = MAGIC.to_vec();
        blob.push(1);
        assert!(matches!(decode(&blob), Err(Error::Snapshot(_))));
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_round_trip_each_compression() {
        let original = store();
        for compression in [None, Some(Compression::Lz4), Some(Compression::Zstd)] {
            let blob = encode(&original, compression).unwrap();
            assert_eq!(decode(&blob).unwrap(), original, "{compression:?}");
        }
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_compressed_header() {
        let blob = encode(&store(), Some(Compression::Zstd)).unwrap();
        assert!(blob.starts_with(MAGIC));
        assert_eq!(blob[MAGIC.len()], Compression::Zstd.tag());
        assert_eq!(Compression::Zstd.as_str(), "zstd");
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_unknown_tag_rejected() {
        let mut blob = MAGIC.to_vec();
        blob.push(9);
        assert!(matches!(decode(&blob), Err(Error::Snapshot(_))));
    }

    fn encode_plain(store: &MetricStore) -> Vec<u8> {
        #[cfg(feature = "compression")]
        let blob = encode(store, None);
        #[cfg(not(feature = "compression"))]
        let blob = encode(store);
        blob.unwrap()
    }

    #[test]
    fn test_non_finite_samples_reload() {
        let mut original = MetricStore::new("nan");
        original.add_metric("loss", f64::NAN);
        original.add_metric("loss", f64::INFINITY);
        original.add_metric("loss", f64::NEG_INFINITY);
        original.add_metric("loss", 0.5);

        let restored = decode(&encode_plain(&original)).unwrap();
        let samples = restored.samples("loss", "trial-0").unwrap();
        assert!(samples[0].is_nan());
        assert_eq!(&samples[1..], &[f64::INFINITY, f64::NEG_INFINITY, 0.5]);
        assert_eq!(restored.name(), "nan");
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(decode(b"not a snapshot"), Err(Error::Json(_))));
    }
}
