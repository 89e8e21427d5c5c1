use std::collections::HashMap;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::foundation::math::mul_div255_u8;

/// Largest avatar edge the masker will produce.
pub const MAX_AVATAR_SIZE: u32 = 4096;

/// Decode avatar bytes (any raster format `image` can load) into straight RGBA8.
pub fn decode_avatar(bytes: &[u8]) -> AvatarGifResult<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AvatarGifError::decode(format!("avatar image: {e}")))?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AvatarGifError::decode("avatar image has zero dimensions"));
    }
    Ok(rgba)
}

/// Decode `bytes` and produce a `size`×`size` circularly masked avatar.
pub fn mask(bytes: &[u8], size: u32) -> AvatarGifResult<RgbaImage> {
    mask_decoded(&decode_avatar(bytes)?, size)
}

/// Resize an already decoded avatar to `size`×`size` and apply the circular alpha mask.
pub fn mask_decoded(avatar: &RgbaImage, size: u32) -> AvatarGifResult<RgbaImage> {
    if size == 0 || size > MAX_AVATAR_SIZE {
        return Err(AvatarGifError::validation(format!(
            "avatar size must be in 1..={MAX_AVATAR_SIZE}, got {size}"
        )));
    }

    let mut out = image::imageops::resize(avatar, size, size, FilterType::Lanczos3);
    let coverage = circle_coverage(size)?;
    for (px, &cov) in out.pixels_mut().zip(coverage.iter()) {
        px.0[3] = mul_div255_u8(u16::from(px.0[3]), u16::from(cov));
        if px.0[3] == 0 {
            px.0 = [0, 0, 0, 0];
        }
    }
    Ok(out)
}

/// Per-pixel coverage (0..=255) of the circle inscribed in a `size`×`size` square.
///
/// The circle is rasterized as SVG so edge pixels get anti-aliased partial coverage.
pub(crate) fn circle_coverage(size: u32) -> AvatarGifResult<Vec<u8>> {
    let r = f64::from(size) / 2.0;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}"><circle cx="{r}" cy="{r}" r="{r}" fill="white"/></svg>"#
    );
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
        .map_err(|e| AvatarGifError::internal(format!("parse circle mask svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| AvatarGifError::internal("failed to allocate circle mask pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(pixmap.pixels().iter().map(|p| p.alpha()).collect())
}

/// Masked avatars for one pipeline invocation, memoized by size.
///
/// The avatar bytes are fixed for the invocation, so size alone is the key. Not shared across
/// invocations.
pub struct MaskCache {
    avatar: RgbaImage,
    by_size: HashMap<u32, RgbaImage>,
}

impl MaskCache {
    /// Decode the avatar once; masks are produced lazily per size.
    pub fn new(avatar_bytes: &[u8]) -> AvatarGifResult<Self> {
        Ok(Self::from_decoded(decode_avatar(avatar_bytes)?))
    }

    /// Build a cache around an already decoded avatar.
    pub fn from_decoded(avatar: RgbaImage) -> Self {
        Self {
            avatar,
            by_size: HashMap::new(),
        }
    }

    /// Masked avatar for `size`, producing it on first use.
    pub fn get_or_insert(&mut self, size: u32) -> AvatarGifResult<&RgbaImage> {
        if !self.by_size.contains_key(&size) {
            let masked = mask_decoded(&self.avatar, size)?;
            tracing::trace!(size, "masked avatar produced");
            self.by_size.insert(size, masked);
        }
        self.by_size
            .get(&size)
            .ok_or_else(|| AvatarGifError::internal("mask cache lost an inserted entry"))
    }

    /// Previously produced masked avatar for `size`.
    pub fn get(&self, size: u32) -> Option<&RgbaImage> {
        self.by_size.get(&size)
    }

    /// Number of distinct sizes produced so far.
    pub fn len(&self) -> usize {
        self.by_size.len()
    }

    /// Whether no sizes have been produced yet.
    pub fn is_empty(&self) -> bool {
        self.by_size.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/circle.rs"]
mod tests;
