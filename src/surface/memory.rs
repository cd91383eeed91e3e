use super::{PixelAccessor, PixelFormat, PixelSurface};
use crate::color::Color;
use crate::error::RenderError;

/// Heap-allocated pixel surface
///
/// Rows start every `pitch` bytes; any padding past the last pixel of a row
/// is never written by the renderer.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
    locked: bool,
}

impl MemorySurface {
    /// Create a zeroed surface with rows padded to a multiple of 4 bytes
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, RenderError> {
        let row = width as usize * usize::from(format.bytes_per_pixel());
        Self::with_pitch(width, height, (row + 3) & !3, format)
    }

    pub fn with_pitch(
        width: u32,
        height: u32,
        pitch: usize,
        format: PixelFormat,
    ) -> Result<Self, RenderError> {
        format.validate()?;
        let row = width as usize * usize::from(format.bytes_per_pixel());
        if pitch < row {
            return Err(RenderError::UnsupportedFormat(format!(
                "pitch {} is shorter than a {}-pixel row",
                pitch, width
            )));
        }
        Ok(Self {
            pixels: vec![0; pitch * height as usize],
            width,
            height,
            pitch,
            format,
            locked: false,
        })
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Every byte of the surface, padding included
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Native pixel value at (x, y)
    pub fn get_native(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let accessor = PixelAccessor::for_format(&self.format).ok()?;
        let i = y as usize * self.pitch + x as usize * accessor.bytes_per_pixel();
        Some(accessor.load(&self.pixels[i..]))
    }

    pub fn get_rgba(&self, x: i32, y: i32) -> Option<Color> {
        self.get_native(x, y).map(|v| self.format.get_rgba(v))
    }
}

impl PixelSurface for MemorySurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pitch(&self) -> usize {
        self.pitch
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn lock(&mut self) -> Result<(), String> {
        if self.locked {
            return Err("surface is already locked".into());
        }
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        if self.locked {
            Some(&mut self.pixels)
        } else {
            None
        }
    }
}
