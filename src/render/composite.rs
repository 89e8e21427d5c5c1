use image::RgbaImage;

use crate::foundation::math::{mul_div255_u8, premultiply, unpremultiply};
use crate::positions::table::PositionEntry;
use crate::render::rotate::{Rotation, rotate_expand};

/// Offset subtracted from table positions before pasting.
///
/// The position tables were authored against a mask whose visible circle starts 4px inside the
/// pasted square.
pub const DEFAULT_PASTE_INSET: i32 = 4;

pub(crate) type PremulRgba8 = [u8; 4];

/// Premultiplied source-over.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Source-over on straight-alpha pixels.
pub(crate) fn over_straight(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match (src[3], dst[3]) {
        (0, _) => dst,
        (255, _) | (_, 0) => src,
        _ => unpremultiply(over(premultiply(dst), premultiply(src))),
    }
}

/// Where the avatar's top-left corner lands on the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Table x offset.
    pub offset_x: i32,
    /// Table y offset.
    pub offset_y: i32,
    /// Correction subtracted from both offsets.
    pub inset: i32,
}

impl Placement {
    /// Placement for a table entry with the given inset.
    pub fn from_entry(entry: PositionEntry, inset: i32) -> Self {
        Self {
            offset_x: entry.offset_x,
            offset_y: entry.offset_y,
            inset,
        }
    }

    /// Effective paste origin.
    pub fn origin(self) -> (i64, i64) {
        (
            i64::from(self.offset_x) - i64::from(self.inset),
            i64::from(self.offset_y) - i64::from(self.inset),
        )
    }
}

/// Blend `top` over `bottom` in place with its top-left corner at `(x, y)`.
///
/// Pixels of `top` falling outside `bottom` are clipped; negative origins are allowed.
pub fn paste_over(bottom: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (bw, bh) = (i64::from(bottom.width()), i64::from(bottom.height()));
    let (tw, th) = (i64::from(top.width()), i64::from(top.height()));

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + tw).min(bw);
    let y1 = (y + th).min(bh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for by in y0..y1 {
        for bx in x0..x1 {
            let src = top.get_pixel((bx - x) as u32, (by - y) as u32).0;
            let dst = bottom.get_pixel_mut(bx as u32, by as u32);
            dst.0 = over_straight(dst.0, src);
        }
    }
}

/// Composite one frame: paste the masked avatar, then rotate the whole result.
///
/// With an identity rotation the blended frame keeps the canvas size; otherwise the output is
/// the rotation-expanded canvas.
pub fn composite(
    frame: &RgbaImage,
    avatar: &RgbaImage,
    placement: Placement,
    rotation: Rotation,
) -> RgbaImage {
    let mut out = frame.clone();
    let (x, y) = placement.origin();
    paste_over(&mut out, avatar, x, y);

    if rotation.is_identity() {
        return out;
    }
    rotate_expand(&out, rotation)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
