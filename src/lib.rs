//! avatar-gif composites a user avatar onto preset animated GIFs.
//!
//! For each frame of a source GIF the avatar is cropped to a circle, resized per a per-source
//! position table, pasted at the table's offset, optionally rotated, and the frames are
//! re-encoded into a new animation:
//!
//! - Load the [`PositionTables`] and pick a [`SourceStore`]
//! - Resolve a [`CodecBackend`] once with [`resolve_codec_backend`]
//! - Build an [`AvatarGifPipeline`] and [`run`](AvatarGifPipeline::run) an [`AvatarRequest`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod foundation;

/// GIF decode/encode backends.
pub mod codec;
pub(crate) mod mask;
pub(crate) mod pipeline;
pub(crate) mod positions;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, FrameDelay, LoopCount};
pub use crate::foundation::error::{AvatarGifError, AvatarGifResult};
pub use crate::foundation::scratch::Scratch;

pub use crate::assets::store::{DirSourceStore, InMemorySourceStore, SourceStore};
pub use crate::codec::ffmpeg::{FfmpegCodec, is_ffmpeg_on_path};
pub use crate::codec::native::NativeCodec;
pub use crate::codec::{
    CodecBackend, CodecChoice, EncodeJob, SourceFrame, SourceGif, resolve_codec_backend,
};
pub use crate::mask::circle::{MAX_AVATAR_SIZE, MaskCache, decode_avatar, mask, mask_decoded};
pub use crate::pipeline::opts::PipelineOpts;
pub use crate::pipeline::orchestrator::{AvatarGifPipeline, PipelineStage, SourceSummary};
pub use crate::pipeline::request::{AvatarRequest, ValidatedRequest, decode_base64_payload};
pub use crate::positions::table::{PositionEntry, PositionTable, PositionTables};
pub use crate::render::composite::{DEFAULT_PASTE_INSET, Placement, composite, paste_over};
pub use crate::render::rotate::{Rotation, rotate_expand, rotated_canvas_size};
