use crate::foundation::error::{AvatarGifError, AvatarGifResult};

/// Canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> AvatarGifResult<Self> {
        if width == 0 || height == 0 {
            return Err(AvatarGifError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Canvas of an existing bitmap.
    pub fn of(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Byte length of a tightly packed RGBA8 raster of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Inter-frame delay of the output animation, in milliseconds.
///
/// GIF stores delays in centiseconds; [`FrameDelay::centiseconds`] performs the conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameDelay {
    millis: u32,
}

impl FrameDelay {
    /// Create a validated delay (`millis > 0`).
    pub fn from_millis(millis: u32) -> AvatarGifResult<Self> {
        if millis == 0 {
            return Err(AvatarGifError::validation("frame delay must be > 0 ms"));
        }
        Ok(Self { millis })
    }

    /// Delay in milliseconds.
    pub fn millis(self) -> u32 {
        self.millis
    }

    /// Delay rounded to GIF centiseconds, never below 1.
    pub fn centiseconds(self) -> u16 {
        let cs = (u64::from(self.millis) + 5) / 10;
        cs.clamp(1, u64::from(u16::MAX)) as u16
    }
}

/// How many times the animation plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LoopCount {
    /// No loop extension: play once.
    Once,
    /// Repeat `n` additional times.
    Finite(u16),
    /// Loop forever.
    Infinite,
}

impl From<gif::Repeat> for LoopCount {
    fn from(repeat: gif::Repeat) -> Self {
        match repeat {
            gif::Repeat::Infinite => Self::Infinite,
            gif::Repeat::Finite(0) => Self::Once,
            gif::Repeat::Finite(n) => Self::Finite(n),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
