//! The platform boundary: pixel surfaces, their formats, and scoped access to their memory

mod accessor;
mod lock;
mod memory;
#[cfg(feature = "sdl")]
mod sdl;

pub use accessor::{PixelAccessor, PixelView};
pub use lock::SurfaceLock;
pub use memory::MemorySurface;
#[cfg(feature = "sdl")]
pub use sdl::SdlSurface;

use crate::color::Color;
use crate::error::RenderError;

/// A block of pixel memory owned by the platform.
///
/// Pixels are only reachable between a successful `lock` and the matching
/// `unlock`. Callers normally go through [`SurfaceLock`] rather than calling
/// the pair directly.
pub trait PixelSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Bytes between the starts of consecutive rows
    fn pitch(&self) -> usize;
    fn format(&self) -> PixelFormat;
    fn lock(&mut self) -> Result<(), String>;
    fn unlock(&mut self);
    /// Raw pixel bytes, `None` while the surface is not locked
    fn pixels_mut(&mut self) -> Option<&mut [u8]>;
}

impl<T: PixelSurface + ?Sized> PixelSurface for &mut T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pitch(&self) -> usize {
        (**self).pitch()
    }

    fn format(&self) -> PixelFormat {
        (**self).format()
    }

    fn lock(&mut self) -> Result<(), String> {
        (**self).lock()
    }

    fn unlock(&mut self) {
        (**self).unlock();
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        (**self).pixels_mut()
    }
}

// ============================================================================
// Pixel Format
// ============================================================================

/// Packed truecolour layout: bytes per pixel plus one bit mask per channel.
///
/// A zero alpha mask means the format has no alpha; such pixels read back
/// as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    bytes_per_pixel: u8,
    masks: [u32; 4],
}

impl PixelFormat {
    pub const RGBA8888: PixelFormat =
        PixelFormat::from_masks(4, 0xFF000000, 0x00FF0000, 0x0000FF00, 0x000000FF);
    pub const ARGB8888: PixelFormat =
        PixelFormat::from_masks(4, 0x00FF0000, 0x0000FF00, 0x000000FF, 0xFF000000);
    pub const ABGR8888: PixelFormat =
        PixelFormat::from_masks(4, 0x000000FF, 0x0000FF00, 0x00FF0000, 0xFF000000);
    pub const XRGB8888: PixelFormat =
        PixelFormat::from_masks(4, 0x00FF0000, 0x0000FF00, 0x000000FF, 0);
    pub const RGB24: PixelFormat = PixelFormat::from_masks(3, 0xFF0000, 0x00FF00, 0x0000FF, 0);
    pub const RGB565: PixelFormat = PixelFormat::from_masks(2, 0xF800, 0x07E0, 0x001F, 0);
    pub const RGB332: PixelFormat = PixelFormat::from_masks(1, 0xE0, 0x1C, 0x03, 0);

    const fn from_masks(bytes_per_pixel: u8, r: u32, g: u32, b: u32, a: u32) -> Self {
        Self {
            bytes_per_pixel,
            masks: [r, g, b, a],
        }
    }

    /// Build a format from explicit masks, rejecting layouts the rasterizer cannot address
    pub fn new(
        bytes_per_pixel: u8,
        r_mask: u32,
        g_mask: u32,
        b_mask: u32,
        a_mask: u32,
    ) -> Result<Self, RenderError> {
        let format = Self::from_masks(bytes_per_pixel, r_mask, g_mask, b_mask, a_mask);
        format.validate()?;
        Ok(format)
    }

    /// Check the layout once, at bind time
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(1..=4).contains(&self.bytes_per_pixel) {
            return Err(RenderError::UnsupportedFormat(format!(
                "{} bytes per pixel",
                self.bytes_per_pixel
            )));
        }
        if self.masks[..3].iter().any(|&m| m == 0) {
            return Err(RenderError::UnsupportedFormat(
                "palettised formats have no colour masks".into(),
            ));
        }
        let width_mask = if self.bytes_per_pixel == 4 {
            u32::MAX
        } else {
            (1u32 << (u32::from(self.bytes_per_pixel) * 8)) - 1
        };
        for &mask in &self.masks {
            if mask == 0 {
                continue;
            }
            let bits = mask.count_ones();
            let normalized = mask >> mask.trailing_zeros();
            if mask & !width_mask != 0 || normalized.count_ones() != normalized.trailing_ones() {
                return Err(RenderError::UnsupportedFormat(format!(
                    "channel mask {:#010x} does not fit a {}-byte pixel",
                    mask, self.bytes_per_pixel
                )));
            }
            if bits > 8 {
                return Err(RenderError::UnsupportedFormat(format!(
                    "channel mask {:#010x} is wider than 8 bits",
                    mask
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bytes_per_pixel
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.masks[3] != 0
    }

    /// Encode a colour into this format's native pixel value
    #[inline]
    pub fn map_rgba(&self, color: Color) -> u32 {
        self.masks
            .iter()
            .zip(color.channels())
            .filter(|(&mask, _)| mask != 0)
            .fold(0, |pixel, (&mask, c)| {
                let shift = mask.trailing_zeros();
                let bits = mask.count_ones();
                pixel | ((u32::from(c) >> (8 - bits)) << shift)
            })
    }

    /// Decode a native pixel value, expanding narrow channels to the nearest 8-bit value
    #[inline]
    pub fn get_rgba(&self, pixel: u32) -> Color {
        let mut out = [255u8; 4];
        for (slot, &mask) in out.iter_mut().zip(&self.masks) {
            if mask == 0 {
                continue;
            }
            let shift = mask.trailing_zeros();
            let max = mask >> shift;
            let v = (pixel & mask) >> shift;
            *slot = ((v * 255 + max / 2) / max) as u8;
        }
        Color::from_channels(out)
    }
}
