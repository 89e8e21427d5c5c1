use std::io::Cursor;

use image::RgbaImage;

use crate::codec::{CodecBackend, EncodeJob, SourceFrame, SourceGif, binarize_alpha};
use crate::foundation::core::{Canvas, LoopCount};
use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::foundation::scratch::Scratch;

/// Pure Rust GIF codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeCodec;

impl NativeCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }
}

impl CodecBackend for NativeCodec {
    fn name(&self) -> &'static str {
        "native"
    }

    fn decode(&self, bytes: &[u8]) -> AvatarGifResult<SourceGif> {
        decode_gif(bytes)
    }

    fn encode(&self, job: &EncodeJob<'_>, _scratch: &Scratch) -> AvatarGifResult<Vec<u8>> {
        encode_gif(job)
    }
}

/// Decode a GIF into canvas-sized frames.
///
/// Each frame is placed at its `(left, top)` offset on a fresh transparent canvas; disposal is
/// not accumulated across frames.
pub fn decode_gif(bytes: &[u8]) -> AvatarGifResult<SourceGif> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = opts
        .read_info(Cursor::new(bytes))
        .map_err(|e| AvatarGifError::decode(format!("gif header: {e}")))?;

    let canvas = Canvas::new(u32::from(decoder.width()), u32::from(decoder.height()))
        .map_err(|_| AvatarGifError::decode("gif logical screen has zero dimensions"))?;

    let mut frames = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| AvatarGifError::decode(format!("gif frame {}: {e}", frames.len())))?
    {
        let image = expand_to_canvas(
            canvas,
            u32::from(frame.left),
            u32::from(frame.top),
            u32::from(frame.width),
            u32::from(frame.height),
            &frame.buffer,
        )
        .map_err(|e| AvatarGifError::decode(format!("gif frame {}: {e}", frames.len())))?;

        frames.push(SourceFrame {
            index: frames.len(),
            image,
            delay_cs: (frame.delay > 0).then_some(frame.delay),
        });
    }

    if frames.is_empty() {
        return Err(AvatarGifError::decode("gif contains no frames"));
    }

    let loop_count = LoopCount::from(decoder.repeat());
    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        frames = frames.len(),
        ?loop_count,
        "gif decoded"
    );
    Ok(SourceGif {
        canvas,
        loop_count,
        frames,
    })
}

/// Copy a `width`×`height` RGBA patch onto a transparent canvas at `(left, top)`, clipping.
pub(crate) fn expand_to_canvas(
    canvas: Canvas,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> AvatarGifResult<RgbaImage> {
    let expected = (width as usize) * (height as usize) * 4;
    if rgba.len() != expected {
        return Err(AvatarGifError::decode(format!(
            "frame buffer is {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        )));
    }

    let mut out = RgbaImage::new(canvas.width, canvas.height);
    if width == 0 || height == 0 || left >= canvas.width || top >= canvas.height {
        return Ok(out);
    }

    let copy_w = width.min(canvas.width - left) as usize;
    let copy_h = height.min(canvas.height - top);
    let dst_stride = canvas.width as usize * 4;
    let src_stride = width as usize * 4;
    let dst = &mut *out;
    for row in 0..copy_h as usize {
        let s = row * src_stride;
        let d = (top as usize + row) * dst_stride + left as usize * 4;
        dst[d..d + copy_w * 4].copy_from_slice(&rgba[s..s + copy_w * 4]);
    }
    Ok(out)
}

/// Encode frames with the `gif` crate's quantizer.
pub fn encode_gif(job: &EncodeJob<'_>) -> AvatarGifResult<Vec<u8>> {
    job.validate()?;
    let w = job.canvas.width as u16;
    let h = job.canvas.height as u16;
    let map_err = |e: gif::EncodingError| AvatarGifError::encode(format!("gif encoder: {e}"));

    let mut out = Vec::with_capacity(job.canvas.rgba_len() / 4 * job.frames.len() / 2);
    {
        let mut encoder = gif::Encoder::new(&mut out, w, h, &[]).map_err(map_err)?;
        match job.loop_count {
            LoopCount::Infinite => encoder.set_repeat(gif::Repeat::Infinite).map_err(map_err)?,
            LoopCount::Finite(n) => encoder.set_repeat(gif::Repeat::Finite(n)).map_err(map_err)?,
            LoopCount::Once => {}
        }

        let mut rgba = Vec::with_capacity(job.canvas.rgba_len());
        for image in job.frames {
            rgba.clear();
            rgba.extend_from_slice(image.as_raw());
            binarize_alpha(&mut rgba, job.alpha_threshold);

            let mut frame = gif::Frame::from_rgba_speed(w, h, &mut rgba, job.quantizer_speed);
            frame.delay = job.delay.centiseconds();
            frame.dispose = gif::DisposalMethod::Background;
            encoder.write_frame(&frame).map_err(map_err)?;
        }
    }

    tracing::debug!(
        frames = job.frames.len(),
        bytes = out.len(),
        "gif encoded (native)"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/native.rs"]
mod tests;
