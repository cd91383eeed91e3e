use std::ops::Range;

use crate::geometry::Rect;
use crate::raster::Span;

/// Surface bounds plus the optional clip rectangle, always clamped inside them.
///
/// Every test is half-open: a rectangle covers `[x, x+w) x [y, y+h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRegion {
    bounds: Rect,
    clip: Option<Rect>,
}

impl ClipRegion {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: Rect::new(
                0,
                0,
                i32::try_from(width).unwrap_or(i32::MAX),
                i32::try_from(height).unwrap_or(i32::MAX),
            ),
            clip: None,
        }
    }

    /// Set or remove the clip rectangle. A rectangle entirely off the surface
    /// becomes an empty clip that rejects every pixel.
    pub fn set(&mut self, rect: Option<Rect>) {
        self.clip = rect.map(|r| r.intersection(&self.bounds).unwrap_or_default());
    }

    #[inline]
    pub fn rect(&self) -> Option<Rect> {
        self.clip
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Clip rectangle test only; always true without a clip
    #[inline]
    pub fn clip_point(&self, x: i32, y: i32) -> bool {
        self.clip.map_or(true, |c| c.contains(x, y))
    }

    /// Inside the surface and the clip
    #[inline]
    pub fn visible(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y) && self.clip_point(x, y)
    }

    /// The writable area: the clip if set, else the whole surface
    #[inline]
    pub fn area(&self) -> Rect {
        self.clip.unwrap_or(self.bounds)
    }

    /// Narrow `rect` to the writable area. Returns false, leaving `rect` with
    /// zero size, when nothing of it is writable.
    pub fn clip_rect_to_clip(&self, rect: &mut Rect) -> bool {
        match rect.intersection(&self.area()) {
            Some(r) => {
                *rect = r;
                true
            },
            None => {
                rect.w = 0;
                rect.h = 0;
                false
            },
        }
    }

    /// Rows of the writable area
    #[inline]
    pub fn rows(&self) -> Range<i32> {
        let a = self.area();
        a.y..a.bottom()
    }

    /// Writable part of a span as `(y, x0, x1)`, inclusive
    pub fn span(&self, span: Span) -> Option<(u32, u32, u32)> {
        let a = self.area();
        if a.is_empty() || span.y < a.y || span.y >= a.bottom() {
            return None;
        }
        let x0 = span.x_start.max(a.x);
        let x1 = span.x_end.min(a.right() - 1);
        if x1 < x0 {
            return None;
        }
        Some((span.y as u32, x0 as u32, x1 as u32))
    }
}
