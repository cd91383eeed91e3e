use super::canvas::Canvas;
use crate::geometry::Point;
use crate::raster::AaPixel;

/// Candidate pixels buffered before they are clipped and written
pub(crate) const BATCH_SIZE: usize = 256;

/// Something a rasterizer emits that the canvas knows how to write
pub(crate) trait Plot: Copy {
    fn plot(self, canvas: &mut Canvas<'_>);
}

impl Plot for Point {
    #[inline]
    fn plot(self, canvas: &mut Canvas<'_>) {
        canvas.plot(self.x, self.y);
    }
}

impl Plot for AaPixel {
    #[inline]
    fn plot(self, canvas: &mut Canvas<'_>) {
        canvas.plot_aa(self);
    }
}

/// Collects generator output in fixed-size bursts; flushes when full and on drop
pub(crate) struct BatchWriter<'c, 'a, P: Plot> {
    canvas: &'c mut Canvas<'a>,
    pending: Vec<P>,
    written: usize,
}

impl<'c, 'a, P: Plot> BatchWriter<'c, 'a, P> {
    pub(crate) fn new(canvas: &'c mut Canvas<'a>) -> Self {
        Self {
            canvas,
            pending: Vec::with_capacity(BATCH_SIZE),
            written: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, p: P) {
        self.pending.push(p);
        if self.pending.len() == BATCH_SIZE {
            self.flush();
        }
    }

    pub(crate) fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let n = self.pending.len();
        for p in self.pending.drain(..) {
            p.plot(self.canvas);
        }
        log::trace!("flushed {} candidate pixels", n);
        self.written += n;
    }

    /// Flush what is left and report how many candidates went through
    pub(crate) fn finish(mut self) -> usize {
        self.flush();
        self.written
    }
}

impl<P: Plot> Extend<P> for BatchWriter<'_, '_, P> {
    fn extend<T: IntoIterator<Item = P>>(&mut self, iter: T) {
        for p in iter {
            self.push(p);
        }
    }
}

impl<P: Plot> Drop for BatchWriter<'_, '_, P> {
    fn drop(&mut self) {
        self.flush();
    }
}
