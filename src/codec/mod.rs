//! GIF container decode/encode behind an injectable codec backend.
//!
//! The pipeline only sees [`CodecBackend`]; which implementation (pure Rust or an external
//! `ffmpeg` binary) is used is decided once at startup by [`resolve_codec_backend`].

use std::sync::Arc;

use image::RgbaImage;

use crate::foundation::core::{Canvas, FrameDelay, LoopCount};
use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::foundation::scratch::Scratch;

/// `ffmpeg`-backed encoder.
pub mod ffmpeg;
/// Pure Rust codec built on the `gif` crate.
pub mod native;

/// One decoded source frame, already resolved to the full canvas.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    /// Position in the source frame sequence.
    pub index: usize,
    /// Canvas-sized straight RGBA8 raster.
    pub image: RgbaImage,
    /// Delay hint from the source, in centiseconds.
    pub delay_cs: Option<u16>,
}

/// A decoded preset GIF.
#[derive(Clone, Debug)]
pub struct SourceGif {
    /// Logical screen size.
    pub canvas: Canvas,
    /// Loop behavior declared by the source.
    pub loop_count: LoopCount,
    /// Frames in display order.
    pub frames: Vec<SourceFrame>,
}

impl SourceGif {
    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Everything an encoder needs to assemble the output animation.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    /// Output canvas; every frame must have exactly this size.
    pub canvas: Canvas,
    /// Frames in display order.
    pub frames: &'a [RgbaImage],
    /// Delay applied to every frame.
    pub delay: FrameDelay,
    /// Loop behavior of the output.
    pub loop_count: LoopCount,
    /// Pixels with alpha below this become fully transparent; the rest become opaque.
    pub alpha_threshold: u8,
    /// Quantizer speed, `1..=30` (1 = best quality).
    pub quantizer_speed: i32,
}

impl EncodeJob<'_> {
    /// Check frame sizes and encoder parameters.
    pub fn validate(&self) -> AvatarGifResult<()> {
        if self.frames.is_empty() {
            return Err(AvatarGifError::encode("no frames to encode"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(AvatarGifError::encode(format!(
                "canvas {}x{} exceeds the GIF limit of 65535x65535",
                self.canvas.width, self.canvas.height
            )));
        }
        if !(1..=30).contains(&self.quantizer_speed) {
            return Err(AvatarGifError::encode(format!(
                "quantizer speed must be in 1..=30, got {}",
                self.quantizer_speed
            )));
        }
        if let Some((idx, f)) = self
            .frames
            .iter()
            .enumerate()
            .find(|(_, f)| Canvas::of(f) != self.canvas)
        {
            return Err(AvatarGifError::encode(format!(
                "frame {idx} is {}x{}, expected {}x{}",
                f.width(),
                f.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }
        Ok(())
    }
}

/// Codec capability the pipeline depends on.
pub trait CodecBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Parse a GIF container into canvas-sized frames.
    fn decode(&self, bytes: &[u8]) -> AvatarGifResult<SourceGif>;

    /// Encode frames into an animated GIF. `scratch` is available for intermediate files.
    fn encode(&self, job: &EncodeJob<'_>, scratch: &Scratch) -> AvatarGifResult<Vec<u8>>;
}

/// Which codec backend to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecChoice {
    /// Pure Rust `gif` crate.
    #[default]
    Native,
    /// System `ffmpeg` binary for encoding.
    Ffmpeg,
}

/// Resolve a codec backend once at process startup.
///
/// For [`CodecChoice::Ffmpeg`] the platform-specific binary is located here, and a missing
/// binary is reported immediately rather than on the first request.
pub fn resolve_codec_backend(choice: CodecChoice) -> AvatarGifResult<Arc<dyn CodecBackend>> {
    match choice {
        CodecChoice::Native => Ok(Arc::new(native::NativeCodec::new())),
        CodecChoice::Ffmpeg => {
            let codec = ffmpeg::FfmpegCodec::locate();
            if !codec.is_available() {
                return Err(AvatarGifError::validation(format!(
                    "codec backend 'ffmpeg' requested, but '{}' could not be run",
                    codec.binary().display()
                )));
            }
            Ok(Arc::new(codec))
        }
    }
}

/// Threshold alpha and force opaque pixels to alpha 255, as GIF has 1-bit transparency.
pub(crate) fn binarize_alpha(rgba: &mut [u8], threshold: u8) {
    for px in rgba.chunks_exact_mut(4) {
        if px[3] < threshold || px[3] == 0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            px[3] = 255;
        }
    }
}
