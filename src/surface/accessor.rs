use super::PixelFormat;
use crate::error::RenderError;

/// Fixed-width pixel load/store, chosen once per surface from its bytes per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelAccessor {
    Bpp1,
    Bpp2,
    Bpp3,
    Bpp4,
}

impl PixelAccessor {
    pub fn for_format(format: &PixelFormat) -> Result<Self, RenderError> {
        match format.bytes_per_pixel() {
            1 => Ok(Self::Bpp1),
            2 => Ok(Self::Bpp2),
            3 => Ok(Self::Bpp3),
            4 => Ok(Self::Bpp4),
            n => Err(RenderError::UnsupportedFormat(format!("{} bytes per pixel", n))),
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bpp1 => 1,
            Self::Bpp2 => 2,
            Self::Bpp3 => 3,
            Self::Bpp4 => 4,
        }
    }

    /// Load one native-endian pixel from the start of `bytes`
    #[inline]
    pub(crate) fn load(self, bytes: &[u8]) -> u32 {
        match self {
            Self::Bpp1 => u32::from(bytes[0]),
            Self::Bpp2 => u32::from(u16::from_ne_bytes([bytes[0], bytes[1]])),
            Self::Bpp3 => {
                let [b0, b1, b2] = [bytes[0], bytes[1], bytes[2]].map(u32::from);
                if cfg!(target_endian = "little") {
                    b0 | (b1 << 8) | (b2 << 16)
                } else {
                    (b0 << 16) | (b1 << 8) | b2
                }
            },
            Self::Bpp4 => u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    #[inline]
    fn store(self, bytes: &mut [u8], value: u32) {
        match self {
            Self::Bpp1 => bytes[0] = value as u8,
            Self::Bpp2 => bytes[..2].copy_from_slice(&(value as u16).to_ne_bytes()),
            Self::Bpp3 => {
                let v = if cfg!(target_endian = "little") {
                    [value as u8, (value >> 8) as u8, (value >> 16) as u8]
                } else {
                    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
                };
                bytes[..3].copy_from_slice(&v);
            },
            Self::Bpp4 => bytes[..4].copy_from_slice(&value.to_ne_bytes()),
        }
    }
}

/// Bounds-checked window onto locked pixel memory.
///
/// Width, height and pitch are checked against the slice once, when the
/// view is created. Every read and write asserts its coordinate, so an
/// out-of-range access is a panic rather than a stray write.
pub struct PixelView<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    pitch: usize,
    accessor: PixelAccessor,
}

impl<'a> PixelView<'a> {
    pub fn new(
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        pitch: usize,
        accessor: PixelAccessor,
    ) -> Result<Self, RenderError> {
        let row_bytes = width as usize * accessor.bytes_per_pixel();
        if pitch < row_bytes {
            return Err(RenderError::UnsupportedFormat(format!(
                "pitch {} is shorter than a {}-pixel row",
                pitch, width
            )));
        }
        let needed = if height == 0 {
            0
        } else {
            (height as usize - 1) * pitch + row_bytes
        };
        if pixels.len() < needed {
            return Err(RenderError::UnsupportedFormat(format!(
                "pixel memory holds {} bytes, {}x{} at pitch {} needs {}",
                pixels.len(),
                width,
                height,
                pitch,
                needed
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            pitch,
            accessor,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} surface",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.pitch + x as usize * self.accessor.bytes_per_pixel()
    }

    #[inline]
    pub fn read(&self, x: u32, y: u32) -> u32 {
        let i = self.offset(x, y);
        self.accessor.load(&self.pixels[i..])
    }

    #[inline]
    pub fn write(&mut self, x: u32, y: u32, value: u32) {
        let i = self.offset(x, y);
        self.accessor.store(&mut self.pixels[i..], value);
    }

    /// Store `value` into `x0..=x1` of row `y`
    pub fn fill_row(&mut self, y: u32, x0: u32, x1: u32, value: u32) {
        if x1 < x0 {
            return;
        }
        let bpp = self.accessor.bytes_per_pixel();
        let start = self.offset(x0, y);
        let end = self.offset(x1, y) + bpp;
        let accessor = self.accessor;
        for px in self.pixels[start..end].chunks_exact_mut(bpp) {
            accessor.store(px, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_width_round_trips() {
        for (accessor, value) in [
            (PixelAccessor::Bpp1, 0xA5),
            (PixelAccessor::Bpp2, 0xBEEF),
            (PixelAccessor::Bpp3, 0x12_3456),
            (PixelAccessor::Bpp4, 0xDEAD_BEEF),
        ] {
            let mut bytes = vec![0u8; 64];
            let mut view = PixelView::new(&mut bytes, 3, 2, 16, accessor).unwrap();
            view.write(2, 1, value);
            assert_eq!(view.read(2, 1), value);
            assert_eq!(view.read(1, 1), 0);
        }
    }

    #[test]
    fn test_row_padding_is_untouched() {
        let mut bytes = vec![0u8; 2 * 12];
        let mut view = PixelView::new(&mut bytes, 2, 2, 12, PixelAccessor::Bpp4).unwrap();
        view.fill_row(0, 0, 1, u32::MAX);
        view.fill_row(1, 0, 1, u32::MAX);
        assert!(bytes[8..12].iter().all(|&b| b == 0));
        assert!(bytes[20..24].iter().all(|&b| b == 0));
        assert!(bytes[12..20].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_rejects_short_pitch_and_short_memory() {
        let mut bytes = vec![0u8; 64];
        assert!(PixelView::new(&mut bytes, 5, 1, 8, PixelAccessor::Bpp2).is_err());
        assert!(PixelView::new(&mut bytes, 4, 9, 8, PixelAccessor::Bpp2).is_err());
        assert!(PixelView::new(&mut bytes, 4, 8, 8, PixelAccessor::Bpp2).is_ok());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_write_panics() {
        let mut bytes = vec![0u8; 16];
        let mut view = PixelView::new(&mut bytes, 2, 2, 8, PixelAccessor::Bpp4).unwrap();
        view.write(2, 0, 1);
    }
}
