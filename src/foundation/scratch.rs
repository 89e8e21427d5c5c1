use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::AvatarGifResult;

/// Per-invocation scratch directory.
///
/// Acquired at pipeline start and removed when dropped, so every exit path (success, error,
/// unwinding) releases it. Codec backends that need files for intermediate artifacts write them
/// here.
#[derive(Debug)]
pub struct Scratch {
    dir: tempfile::TempDir,
}

impl Scratch {
    /// Create a fresh scratch directory under `root` (or the system temp dir).
    pub fn acquire(root: Option<&Path>) -> AvatarGifResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("avatar-gif-");
        let dir = match root {
            Some(root) => builder
                .tempdir_in(root)
                .with_context(|| format!("create scratch dir in '{}'", root.display()))?,
            None => builder.tempdir().context("create scratch dir")?,
        };
        tracing::debug!(path = %dir.path().display(), "scratch acquired");
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file named `name` inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        tracing::debug!(path = %self.dir.path().display(), "scratch released");
    }
}
