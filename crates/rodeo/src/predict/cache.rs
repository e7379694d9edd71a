//! Content-addressed cache for image annotations.
//!
//! Entries are keyed by the SHA-256 of the image bytes, so a renamed file
//! hits the cache and a modified file misses it. The cache is opened once
//! per run and flushed explicitly when the run completes.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, RodeoError};

use super::image::{ImageAnnotations, ImageAnnotator};

const CACHE_VERSION: u32 = 1;

/// Cache key for a blob of content: `sha256:<hex>`.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: BTreeMap<String, ImageAnnotations>,
}

/// Disk-backed (or in-memory) map from content hash to annotations.
#[derive(Debug, Default)]
pub struct AnnotationCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, ImageAnnotations>,
    dirty: bool,
}

impl AnnotationCache {
    /// Cache that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a cache file. A missing file yields an empty cache.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let file = File::open(path).map_err(|e| {
            RodeoError::Cache(format!("Failed to open cache '{}': {}", path.display(), e))
        })?;
        let parsed: CacheFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            RodeoError::Cache(format!("Failed to parse cache '{}': {}", path.display(), e))
        })?;

        if parsed.version != CACHE_VERSION {
            return Err(RodeoError::Cache(format!(
                "Unsupported cache version {} in '{}'",
                parsed.version,
                path.display()
            )));
        }

        debug!(entries = parsed.entries.len(), path = %path.display(), "opened annotation cache");

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries: parsed.entries,
            dirty: false,
        })
    }

    /// Return cached annotations for `bytes`, computing and storing them on a miss.
    ///
    /// Failed computations are not cached.
    pub fn get_or_compute<F>(&mut self, bytes: &[u8], compute: F) -> Result<ImageAnnotations>
    where
        F: FnOnce(&[u8]) -> Result<ImageAnnotations>,
    {
        let key = content_key(bytes);
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }

        let computed = compute(bytes)?;
        self.entries.insert(key, computed.clone());
        self.dirty = true;
        Ok(computed)
    }

    /// Cached annotations for `bytes`, if any.
    pub fn get(&self, bytes: &[u8]) -> Option<&ImageAnnotations> {
        self.entries.get(&content_key(bytes))
    }

    /// Write the cache to disk if it changed since opening.
    pub fn flush(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    RodeoError::Cache(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            RodeoError::Cache(format!("Failed to create cache '{}': {}", path.display(), e))
        })?;
        let snapshot = CacheFile {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)?;

        debug!(entries = self.entries.len(), path = %path.display(), "flushed annotation cache");
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps an annotator so each distinct image is annotated at most once.
pub struct CachedAnnotator<A> {
    inner: A,
    cache: Mutex<AnnotationCache>,
}

impl<A: ImageAnnotator> CachedAnnotator<A> {
    pub fn new(inner: A, cache: AnnotationCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AnnotationCache>> {
        self.cache
            .lock()
            .map_err(|_| RodeoError::Cache("annotation cache lock poisoned".to_string()))
    }

    /// Persist new entries.
    pub fn flush(&self) -> Result<()> {
        self.lock()?.flush()
    }

    /// Number of cached entries.
    pub fn cached(&self) -> usize {
        self.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: ImageAnnotator> ImageAnnotator for CachedAnnotator<A> {
    fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations> {
        self.lock()?
            .get_or_compute(image, |bytes| self.inner.annotate(bytes))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::MockAnnotator;

    fn labels(l: &[&str]) -> ImageAnnotations {
        ImageAnnotations {
            labels: l.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_key() {
        assert_eq!(
            content_key(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_key(b"a"), content_key(b"b"));
    }

    #[test]
    fn test_get_or_compute_memoizes() {
        let mut cache = AnnotationCache::in_memory();
        let mut calls = 0;

        for _ in 0..3 {
            let got = cache
                .get_or_compute(b"image", |_| {
                    calls += 1;
                    Ok(labels(&["cat"]))
                })
                .unwrap();
            assert_eq!(got.labels, vec!["cat"]);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_not_cached() {
        let mut cache = AnnotationCache::in_memory();
        let err = cache.get_or_compute(b"image", |_| Err(RodeoError::prediction("vision", "down")));
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_flush_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = AnnotationCache::open(&path).unwrap();
        assert!(cache.is_empty());
        cache.get_or_compute(b"img", |_| Ok(labels(&["dog"]))).unwrap();
        cache.flush().unwrap();

        let reopened = AnnotationCache::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(b"img").unwrap().labels, vec!["dog"]);
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(AnnotationCache::open(&path), Err(RodeoError::Cache(_))));
    }

    #[test]
    fn test_cached_annotator_calls_backend_once() {
        let annotator = CachedAnnotator::new(
            MockAnnotator::new(labels(&["tree"])),
            AnnotationCache::in_memory(),
        );

        annotator.annotate(b"same bytes").unwrap();
        annotator.annotate(b"same bytes").unwrap();
        annotator.annotate(b"other bytes").unwrap();

        assert_eq!(annotator.inner().calls(), 2);
        assert_eq!(annotator.cached(), 2);
    }
}
