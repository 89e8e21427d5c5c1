use image::RgbaImage;
use kurbo::{Affine, Point, Vec2};

use crate::foundation::error::{AvatarGifError, AvatarGifResult};

/// Clockwise rotation applied to the composited frame, in degrees within `[0, 360]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    degrees: f64,
}

impl Rotation {
    /// No rotation.
    pub const NONE: Self = Self { degrees: 0.0 };

    /// Create a validated rotation.
    pub fn from_degrees(degrees: f64) -> AvatarGifResult<Self> {
        if !degrees.is_finite() || !(0.0..=360.0).contains(&degrees) {
            return Err(AvatarGifError::validation(format!(
                "rotation must be within [0, 360] degrees, got {degrees}"
            )));
        }
        Ok(Self { degrees })
    }

    /// Angle in degrees.
    pub fn degrees(self) -> f64 {
        self.degrees
    }

    /// `true` for 0 and 360 degrees.
    pub fn is_identity(self) -> bool {
        self.degrees == 0.0 || self.degrees == 360.0
    }

    fn radians(self) -> f64 {
        self.degrees.to_radians()
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::NONE
    }
}

/// Size of the canvas that fully contains a `width`×`height` rectangle rotated by `rotation`.
pub fn rotated_canvas_size(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.is_identity() {
        return (width, height);
    }
    let (sin, cos) = rotation.radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (f64::from(width), f64::from(height));

    // Trig noise (cos 90° ≈ 6e-17) must not grow the canvas by a whole pixel.
    let expand = |v: f64| (v - 1e-6).ceil().max(1.0) as u32;
    (expand(w * cos + h * sin), expand(w * sin + h * cos))
}

/// Rotate `src` clockwise around its center into an expanded canvas.
///
/// Every output pixel is inverse-mapped into `src` and bilinearly sampled in premultiplied space;
/// area not covered by `src` is fully transparent.
pub fn rotate_expand(src: &RgbaImage, rotation: Rotation) -> RgbaImage {
    if rotation.is_identity() {
        return src.clone();
    }

    let (sw, sh) = src.dimensions();
    let (dw, dh) = rotated_canvas_size(sw, sh, rotation);

    let src_center = Vec2::new(f64::from(sw) / 2.0, f64::from(sh) / 2.0);
    let dst_center = Vec2::new(f64::from(dw) / 2.0, f64::from(dh) / 2.0);
    let forward = Affine::translate(dst_center)
        * Affine::rotate(rotation.radians())
        * Affine::translate(-src_center);
    let inverse = forward.inverse();

    let mut out = RgbaImage::new(dw, dh);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        px.0 = sample_bilinear(src, p.x, p.y);
    }
    out
}

/// Bilinear sample at continuous coordinates (pixel centers at `i + 0.5`).
fn sample_bilinear(src: &RgbaImage, sx: f64, sy: f64) -> [u8; 4] {
    let fx = sx - 0.5;
    let fy = sy - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let mut acc = [0f64; 4];
    for (dx, dy, weight) in [
        (0, 0, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ] {
        let (x, y) = (x0 + dx, y0 + dy);
        if weight <= 0.0 || x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        let p = src.get_pixel(x as u32, y as u32).0;
        let a = f64::from(p[3]) * weight;
        acc[0] += f64::from(p[0]) * a;
        acc[1] += f64::from(p[1]) * a;
        acc[2] += f64::from(p[2]) * a;
        acc[3] += a;
    }

    let alpha = acc[3].round();
    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let un = |c: f64| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    [un(acc[0]), un(acc[1]), un(acc[2]), alpha.min(255.0) as u8]
}

#[cfg(test)]
#[path = "../../tests/unit/render/rotate.rs"]
mod tests;
