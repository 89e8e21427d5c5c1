use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{AvatarGifError, AvatarGifResult};

/// Static asset store holding the preset source GIFs.
///
/// Implementations must be shareable across concurrent pipeline invocations.
pub trait SourceStore: Send + Sync {
    /// Raw bytes of the named source GIF, or [`AvatarGifError::SourceNotFound`].
    fn load(&self, source_name: &str) -> AvatarGifResult<Arc<[u8]>>;
}

/// Validate a source name as a plain file name.
///
/// Source names are looked up as keys, never interpreted as paths: separators, `.`/`..` and
/// empty names are rejected.
pub(crate) fn validate_source_name(source_name: &str) -> AvatarGifResult<&str> {
    if source_name.is_empty() {
        return Err(AvatarGifError::validation("source name must be non-empty"));
    }
    if source_name.contains(['/', '\\', '\0']) || source_name == "." || source_name == ".." {
        return Err(AvatarGifError::validation(format!(
            "source name '{source_name}' must be a plain file name"
        )));
    }
    Ok(source_name)
}

/// Source store backed by a directory of GIF files.
#[derive(Clone, Debug)]
pub struct DirSourceStore {
    root: PathBuf,
}

impl DirSourceStore {
    /// Create a store reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceStore for DirSourceStore {
    fn load(&self, source_name: &str) -> AvatarGifResult<Arc<[u8]>> {
        let name = validate_source_name(source_name)?;
        let path = self.root.join(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                return Err(AvatarGifError::source_not_found(format!(
                    "'{name}' is not present in '{}'",
                    self.root.display()
                )));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read source gif '{}'", path.display()))
                    .into());
            }
        };
        tracing::debug!(source = name, bytes = bytes.len(), "source gif loaded");
        Ok(bytes.into())
    }
}

/// In-memory source store for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct InMemorySourceStore {
    sources: BTreeMap<String, Arc<[u8]>>,
}

impl InMemorySourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a source.
    pub fn insert(&mut self, source_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.sources.insert(source_name.into(), bytes.into());
    }

    /// Builder-style [`InMemorySourceStore::insert`].
    pub fn with(mut self, source_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(source_name, bytes);
        self
    }
}

impl SourceStore for InMemorySourceStore {
    fn load(&self, source_name: &str) -> AvatarGifResult<Arc<[u8]>> {
        self.sources
            .get(source_name)
            .cloned()
            .ok_or_else(|| AvatarGifError::source_not_found(source_name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
