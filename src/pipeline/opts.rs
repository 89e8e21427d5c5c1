use std::path::PathBuf;

use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::render::composite::DEFAULT_PASTE_INSET;

/// Tunables of one [`AvatarGifPipeline`](crate::AvatarGifPipeline).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOpts {
    /// Concurrent per-frame compositions (worker ceiling). `1` runs sequentially.
    pub workers: usize,
    /// Pixels subtracted from table offsets before pasting.
    pub paste_inset: i32,
    /// Output pixels with alpha below this are transparent, the rest opaque.
    pub alpha_threshold: u8,
    /// GIF quantizer speed, `1..=30`.
    pub quantizer_speed: i32,
    /// Directory under which per-invocation scratch directories are created.
    ///
    /// `None` uses the system temp dir.
    pub scratch_root: Option<PathBuf>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            workers: 4,
            paste_inset: DEFAULT_PASTE_INSET,
            alpha_threshold: 128,
            quantizer_speed: 10,
            scratch_root: None,
        }
    }
}

impl PipelineOpts {
    /// Upper bound on `workers`.
    pub const MAX_WORKERS: usize = 64;

    /// Validate option ranges.
    pub fn validate(&self) -> AvatarGifResult<()> {
        if self.workers == 0 || self.workers > Self::MAX_WORKERS {
            return Err(AvatarGifError::validation(format!(
                "pipeline workers must be in 1..={}, got {}",
                Self::MAX_WORKERS,
                self.workers
            )));
        }
        if !(1..=30).contains(&self.quantizer_speed) {
            return Err(AvatarGifError::validation(format!(
                "quantizer speed must be in 1..=30, got {}",
                self.quantizer_speed
            )));
        }
        if self.alpha_threshold == 0 {
            return Err(AvatarGifError::validation(
                "alpha threshold must be >= 1 (alpha 0 is always transparent)",
            ));
        }
        Ok(())
    }
}
