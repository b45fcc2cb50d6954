//! Path + modification-time keyed cache of decoded pattern images

use super::decoder::decode_bytes;
use super::pattern::{Pattern, PatternImage};
use crate::error::{VisionError, VisionResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::SystemTime;

/// One cached decode. The cell is filled by exactly one loader; everyone else
/// asking for the same `(path, mtime)` blocks on it.
struct CacheSlot {
    modified: Option<SystemTime>,
    cell: OnceLock<VisionResult<Arc<PatternImage>>>,
}

impl CacheSlot {
    fn new(modified: Option<SystemTime>) -> Self {
        Self {
            modified,
            cell: OnceLock::new(),
        }
    }
}

/// Shared store of decoded pattern images.
///
/// Owned by the caller and shared through `Arc`. Entries are keyed by the
/// canonical path; an entry whose file modification time changed is decoded
/// again on the next load.
#[derive(Default)]
pub struct ImageStore {
    entries: Mutex<HashMap<PathBuf, Arc<CacheSlot>>>,
    decodes: AtomicUsize,
    hits: AtomicUsize,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reuse) the decoded image at `path`
    pub fn load(&self, path: impl AsRef<Path>) -> VisionResult<Arc<PatternImage>> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| io_error(path, e))?;
        let modified = std::fs::metadata(&canonical)
            .map_err(|e| io_error(&canonical, e))?
            .modified()
            .ok();

        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&canonical) {
                Some(slot) if slot.modified == modified => Arc::clone(slot),
                existing => {
                    if existing.is_some() {
                        log::debug!("♻️ {} changed on disk, reloading", canonical.display());
                    }
                    let slot = Arc::new(CacheSlot::new(modified));
                    entries.insert(canonical.clone(), Arc::clone(&slot));
                    slot
                }
            }
        };

        if slot.cell.get().is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("Cache hit for {}", canonical.display());
        }

        let result = slot
            .cell
            .get_or_init(|| self.decode_file(&canonical))
            .clone();

        if result.is_err() {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if entries
                .get(&canonical)
                .is_some_and(|current| Arc::ptr_eq(current, &slot))
            {
                entries.remove(&canonical);
            }
        }

        result
    }

    /// Load the image at `path` as a pattern with the given threshold
    pub fn load_pattern(&self, path: impl AsRef<Path>, threshold: f32) -> VisionResult<Pattern> {
        let image = self.load(path)?;
        Ok(Pattern::new(image).similar(threshold))
    }

    /// Drop the cached entry for `path`, if any. Returns whether one existed.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total decodes performed since the store was created
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Loads answered from an already decoded entry
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    fn decode_file(&self, path: &Path) -> VisionResult<Arc<PatternImage>> {
        self.decodes.fetch_add(1, Ordering::Relaxed);
        let start_time = std::time::Instant::now();

        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        let rgb = decode_bytes(&bytes, Some(path)).map_err(|e| {
            log::warn!("❌ Failed to decode {}: {}", path.display(), e);
            e
        })?;

        let image = PatternImage::from_file(path, rgb);
        log::debug!(
            "🖼️ Decoded '{}' {}x{} in {}ms",
            image.name(),
            image.width(),
            image.height(),
            start_time.elapsed().as_millis()
        );
        Ok(Arc::new(image))
    }
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("entries", &self.len())
            .field("decodes", &self.decode_count())
            .field("hits", &self.hit_count())
            .finish()
    }
}

fn io_error(path: &Path, e: std::io::Error) -> VisionError {
    if e.kind() == ErrorKind::NotFound {
        VisionError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        VisionError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}
