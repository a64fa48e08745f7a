//! Signature-checked registry cache.
//!
//! The catalog is re-read only when the underlying files' modification
//! signature changes. Replacement swaps the whole `Arc`; readers holding the
//! previous catalog are never blocked or mutated under.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::UNIX_EPOCH,
};

use tracing::debug;

use crate::registry::{catalog::AgentCatalog, error::RegistryError, loader::load_catalog};

struct CacheEntry {
    signature: String,
    catalog: Arc<AgentCatalog>,
}

pub struct RegistryCache {
    agents_dir: PathBuf,
    inner: RwLock<Option<CacheEntry>>,
}

impl RegistryCache {
    pub fn new(agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents_dir: agents_dir.into(),
            inner: RwLock::new(None),
        }
    }

    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    /// Current catalog. Returns the identical `Arc` while the signature is
    /// unchanged; a fresh one after the registry files move.
    pub fn catalog(&self) -> Result<Arc<AgentCatalog>, RegistryError> {
        let signature = compute_signature(&self.agents_dir);

        {
            let guard = self.inner.read().expect("registry cache lock poisoned");
            if let Some(entry) = guard.as_ref() {
                if entry.signature == signature {
                    return Ok(Arc::clone(&entry.catalog));
                }
            }
        }

        debug!(dir = %self.agents_dir.display(), "registry signature changed, reloading");
        let catalog = Arc::new(load_catalog(&self.agents_dir, false)?);
        let mut guard = self.inner.write().expect("registry cache lock poisoned");
        *guard = Some(CacheEntry {
            signature,
            catalog: Arc::clone(&catalog),
        });
        Ok(catalog)
    }
}

/// Modification signature over every agent definition and prompt file.
fn compute_signature(agents_dir: &Path) -> String {
    let Ok(entries) = fs::read_dir(agents_dir) else {
        return "absent".to_string();
    };

    let mut parts = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        for file in ["agent.yml", "prompt.md"] {
            let path = dir.join(file);
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|duration| duration.as_nanos())
                .unwrap_or(0);
            parts.push(format!("{}:{}:{}", path.display(), mtime, metadata.len()));
        }
    }
    parts.sort();
    parts.join("\n")
}
