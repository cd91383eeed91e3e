use super::{PixelAccessor, PixelSurface, PixelView};
use crate::error::RenderError;

/// Holds a surface locked for direct memory access; unlocks on drop.
///
/// A guard only exists once `lock` has succeeded, so every guard that is
/// dropped pairs with exactly one successful lock.
pub struct SurfaceLock<'a, S: PixelSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: PixelSurface + ?Sized> SurfaceLock<'a, S> {
    pub fn acquire(surface: &'a mut S) -> Result<Self, RenderError> {
        match surface.lock() {
            Ok(()) => Ok(Self { surface }),
            Err(reason) => {
                log::warn!("could not lock {}x{} surface: {}", surface.width(), surface.height(), reason);
                Err(RenderError::LockFailed(reason))
            },
        }
    }

    /// Checked view over the locked pixels
    pub fn view(&mut self, accessor: PixelAccessor) -> Result<PixelView<'_>, RenderError> {
        let width = self.surface.width();
        let height = self.surface.height();
        let pitch = self.surface.pitch();
        let pixels = self
            .surface
            .pixels_mut()
            .ok_or_else(|| RenderError::LockFailed("locked surface exposed no pixel memory".into()))?;
        PixelView::new(pixels, width, height, pitch, accessor)
    }
}

impl<S: PixelSurface + ?Sized> Drop for SurfaceLock<'_, S> {
    fn drop(&mut self) {
        self.surface.unlock();
    }
}
