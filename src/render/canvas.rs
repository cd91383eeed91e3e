use super::blend::{compose, mix};
use super::clip::ClipRegion;
use crate::color::{BlendMode, Color};
use crate::raster::{AaPixel, Span};
use crate::surface::{PixelFormat, PixelView};

/// Drawing state for the duration of one locked call
pub(crate) struct Canvas<'a> {
    view: PixelView<'a>,
    format: PixelFormat,
    clip: ClipRegion,
    mode: BlendMode,
    color: Color,
    mapped: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(
        view: PixelView<'a>,
        format: PixelFormat,
        clip: ClipRegion,
        mode: BlendMode,
        color: Color,
        mapped: u32,
    ) -> Self {
        Self {
            view,
            format,
            clip,
            mode,
            color,
            mapped,
        }
    }

    #[inline]
    pub(crate) fn clip(&self) -> &ClipRegion {
        &self.clip
    }

    /// Raw store; the caller has already checked visibility
    #[inline]
    pub(crate) fn put_pixel(&mut self, x: i32, y: i32, pixel: u32) {
        self.view.write(x as u32, y as u32, pixel);
    }

    #[inline]
    pub(crate) fn get_pixel(&self, x: i32, y: i32) -> u32 {
        self.view.read(x as u32, y as u32)
    }

    #[inline]
    fn get_rgba(&self, x: i32, y: i32) -> Color {
        self.format.get_rgba(self.get_pixel(x, y))
    }

    /// One pixel in the draw colour under the active blend mode
    #[inline]
    pub(crate) fn plot(&mut self, x: i32, y: i32) {
        if !self.clip.visible(x, y) {
            return;
        }
        match self.mode {
            BlendMode::None => self.put_pixel(x, y, self.mapped),
            _ => self.apply_blend_mode(x, y, self.color),
        }
    }

    /// One antialiased pixel; the draw colour's alpha scales the coverage
    #[inline]
    pub(crate) fn plot_aa(&mut self, px: AaPixel) {
        if !self.clip.visible(px.x, px.y) {
            return;
        }
        let coverage = px.coverage * f32::from(self.color.a) / 255.0;
        self.blend_color(px.x, px.y, self.color, coverage);
    }

    /// Composite `src` at (x, y) under the active blend mode
    pub(crate) fn apply_blend_mode(&mut self, x: i32, y: i32, src: Color) {
        if !self.clip.visible(x, y) {
            return;
        }
        match self.mode {
            BlendMode::None => {
                let pixel = self.format.map_rgba(src);
                self.put_pixel(x, y, pixel);
            },
            _ if src.a == 0 => {},
            BlendMode::Blend if src.a == 255 => {
                let pixel = self.format.map_rgba(src);
                self.put_pixel(x, y, pixel);
            },
            mode => {
                let out = compose(mode, src, self.get_rgba(x, y));
                self.put_pixel(x, y, self.format.map_rgba(out));
            },
        }
    }

    /// Coverage blend of a colour into (x, y), ignoring the blend mode
    pub(crate) fn blend_color(&mut self, x: i32, y: i32, src: Color, coverage: f32) {
        if !self.clip.visible(x, y) || !(coverage > 0.0) {
            return;
        }
        let out = if coverage >= 1.0 {
            src
        } else {
            mix(src, self.get_rgba(x, y), coverage)
        };
        self.put_pixel(x, y, self.format.map_rgba(out));
    }

    /// Coverage blend of a native pixel value
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, pixel: u32, coverage: f32) {
        let src = self.format.get_rgba(pixel);
        self.blend_color(x, y, src, coverage);
    }

    /// Fill a span in the draw colour, clipped
    pub(crate) fn fill_span(&mut self, span: Span) {
        let Some((y, x0, x1)) = self.clip.span(span) else {
            return;
        };
        let hard = match self.mode {
            BlendMode::None => true,
            BlendMode::Blend => self.color.a == 255,
            _ => false,
        };
        if hard {
            self.view.fill_row(y, x0, x1, self.mapped);
        } else {
            for x in x0..=x1 {
                self.apply_blend_mode(x as i32, y as i32, self.color);
            }
        }
    }

    /// Whole surface in the mapped draw colour, ignoring clip and blend mode
    pub(crate) fn fill_all(&mut self) {
        let (w, h) = (self.view.width(), self.view.height());
        if w == 0 {
            return;
        }
        for y in 0..h {
            self.view.fill_row(y, 0, w - 1, self.mapped);
        }
    }
}
