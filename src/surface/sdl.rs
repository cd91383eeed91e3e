use sdl2::surface::SurfaceRef;

use super::{PixelFormat, PixelSurface};

/// An SDL surface seen through the [`PixelSurface`] boundary.
///
/// RLE-accelerated surfaces are locked through SDL; everything else is
/// addressed directly.
pub struct SdlSurface<'a> {
    surface: &'a mut SurfaceRef,
    locked: bool,
}

impl<'a> SdlSurface<'a> {
    pub fn new(surface: &'a mut SurfaceRef) -> Self {
        Self {
            surface,
            locked: false,
        }
    }
}

impl PixelSurface for SdlSurface<'_> {
    fn width(&self) -> u32 {
        self.surface.width()
    }

    fn height(&self) -> u32 {
        self.surface.height()
    }

    fn pitch(&self) -> usize {
        self.surface.pitch() as usize
    }

    fn format(&self) -> PixelFormat {
        let format = self.surface.pixel_format_enum();
        let bytes = format.byte_size_per_pixel() as u8;
        match format.into_masks() {
            Ok(m) => PixelFormat {
                bytes_per_pixel: bytes,
                masks: [m.rmask, m.gmask, m.bmask, m.amask],
            },
            // Indexed and FourCC formats have no masks; binding rejects them
            Err(_) => PixelFormat {
                bytes_per_pixel: bytes,
                masks: [0; 4],
            },
        }
    }

    fn lock(&mut self) -> Result<(), String> {
        if self.locked {
            return Err("surface is already locked".into());
        }
        if self.surface.must_lock() {
            // Safety: raw() is a live SDL_Surface for as long as we borrow it
            let rc = unsafe { sdl2::sys::SDL_LockSurface(self.surface.raw()) };
            if rc != 0 {
                return Err(sdl2::get_error());
            }
        }
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) {
        if !self.locked {
            return;
        }
        if self.surface.must_lock() {
            // Safety: paired with the successful SDL_LockSurface above
            unsafe { sdl2::sys::SDL_UnlockSurface(self.surface.raw()) };
        }
        self.locked = false;
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        if !self.locked {
            return None;
        }
        let len = self.surface.pitch() as usize * self.surface.height() as usize;
        // Safety: the surface is locked (or needs no lock) and we hold the only
        // borrow of it; SDL guarantees pitch * h bytes behind `pixels`.
        unsafe {
            let raw = self.surface.raw();
            let base = (*raw).pixels as *mut u8;
            if base.is_null() {
                return None;
            }
            Some(std::slice::from_raw_parts_mut(base, len))
        }
    }
}
