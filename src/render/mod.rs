//! The surface renderer
//!
//! Every drawing call follows the same path: check the renderer is bound,
//! validate arguments, lock the surface, stream a generator from
//! [`crate::raster`] through clipping and blending, unlock. A call that fails
//! validation or locking writes nothing.

mod batch;
mod blend;
mod canvas;
mod clip;
#[cfg(test)]
mod tests;

pub use blend::{compose, mix};
pub use clip::ClipRegion;

use batch::{BatchWriter, Plot};
use canvas::Canvas;

use crate::color::{BlendMode, Color};
use crate::config::RenderSettings;
use crate::error::RenderError;
use crate::geometry::{FPoint, Point, Rect};
use crate::raster::{
    self, AaLinePixels, BSpline, CapsuleSpans, LinePixels, PolygonSpans, PolylinePixels, Span,
    CURVE_TOLERANCE,
};
use crate::surface::{MemorySurface, PixelAccessor, PixelFormat, PixelSurface, SurfaceLock};

/// How far outside the writable area antialiased segments are kept, so the
/// coverage of their visible part is unchanged by clipping
const AA_CLIP_MARGIN: f32 = 2.0;

/// Software renderer drawing into a [`PixelSurface`].
///
/// The renderer holds the surface for its whole life (pass `&mut surface`
/// to borrow one) and keeps its own draw colour, blend mode and clip
/// rectangle. It is single-threaded; the surface is locked once per call.
pub struct SurfaceRenderer<S: PixelSurface> {
    surface: Option<S>,
    accessor: PixelAccessor,
    format: PixelFormat,
    draw_color: Color,
    mapped_color: u32,
    blend_mode: BlendMode,
    clip: ClipRegion,
}

impl SurfaceRenderer<MemorySurface> {
    /// Allocate a zeroed surface and render into it
    pub fn with_new_surface(
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, RenderError> {
        Self::new(MemorySurface::new(width, height, format)?)
    }
}

impl<S: PixelSurface> SurfaceRenderer<S> {
    /// Bind a surface, checking once that its format can be addressed
    pub fn new(surface: S) -> Result<Self, RenderError> {
        let format = surface.format();
        format.validate()?;
        let accessor = PixelAccessor::for_format(&format)?;
        log::debug!(
            "bound {}x{} surface, pitch {}, {} bytes per pixel",
            surface.width(),
            surface.height(),
            surface.pitch(),
            format.bytes_per_pixel()
        );
        let draw_color = Color::WHITE;
        Ok(Self {
            clip: ClipRegion::new(surface.width(), surface.height()),
            surface: Some(surface),
            accessor,
            format,
            draw_color,
            mapped_color: format.map_rgba(draw_color),
            blend_mode: BlendMode::None,
        })
    }

    /// Release the surface; later drawing calls fail with `InvalidSurface`
    pub fn unbind(&mut self) -> Option<S> {
        self.clip = ClipRegion::new(0, 0);
        self.surface.take()
    }

    pub fn into_surface(self) -> Option<S> {
        self.surface
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn bound(&self) -> Result<(), RenderError> {
        if self.surface.is_some() {
            Ok(())
        } else {
            Err(RenderError::InvalidSurface)
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
        self.update_mapped_color();
    }

    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    /// The draw colour encoded for the bound surface
    pub fn mapped_color(&self) -> u32 {
        self.mapped_color
    }

    fn update_mapped_color(&mut self) {
        self.mapped_color = self.format.map_rgba(self.draw_color);
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Restrict drawing to `rect`, clamped to the surface; `None` removes the clip
    pub fn set_clip_rect(&mut self, rect: Option<Rect>) {
        self.clip.set(rect);
    }

    pub fn reset_clip_rect(&mut self) {
        self.clip.set(None);
    }

    pub fn clip_rect(&self) -> Option<Rect> {
        self.clip.rect()
    }

    pub fn is_clip_enabled(&self) -> bool {
        self.clip.rect().is_some()
    }

    /// True when (x, y) passes the clip rectangle, or no clip is set
    pub fn clip_point(&self, x: i32, y: i32) -> bool {
        self.clip.clip_point(x, y)
    }

    /// Narrow `rect` to the writable area; false when nothing is left
    pub fn clip_rect_to_clip(&self, rect: &mut Rect) -> bool {
        self.clip.clip_rect_to_clip(rect)
    }

    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            draw_color: self.draw_color,
            blend_mode: self.blend_mode,
            clip_rect: self.clip.rect(),
        }
    }

    pub fn apply_settings(&mut self, settings: &RenderSettings) {
        self.set_draw_color(settings.draw_color);
        self.set_blend_mode(settings.blend_mode);
        self.set_clip_rect(settings.clip_rect);
    }

    // ========================================================================
    // Locked access
    // ========================================================================

    fn with_canvas<R>(&mut self, draw: impl FnOnce(&mut Canvas<'_>) -> R) -> Result<R, RenderError> {
        self.with_canvas_mode(self.blend_mode, draw)
    }

    fn with_canvas_mode<R>(
        &mut self,
        mode: BlendMode,
        draw: impl FnOnce(&mut Canvas<'_>) -> R,
    ) -> Result<R, RenderError> {
        let surface = self.surface.as_mut().ok_or(RenderError::InvalidSurface)?;
        let mut lock = SurfaceLock::acquire(surface)?;
        let view = lock.view(self.accessor)?;
        let mut canvas = Canvas::new(
            view,
            self.format,
            self.clip,
            mode,
            self.draw_color,
            self.mapped_color,
        );
        Ok(draw(&mut canvas))
    }

    fn plot_all<P: Plot>(&mut self, pixels: impl IntoIterator<Item = P>) -> Result<(), RenderError> {
        let n = self.with_canvas(|canvas| {
            let mut batch = BatchWriter::new(canvas);
            batch.extend(pixels);
            batch.finish()
        })?;
        log::trace!("wrote {} candidate pixels", n);
        Ok(())
    }

    fn fill_spans(&mut self, spans: impl IntoIterator<Item = Span>) -> Result<(), RenderError> {
        self.with_canvas(|canvas| {
            for span in spans {
                canvas.fill_span(span);
            }
        })
    }

    /// Native pixel value at (x, y)
    pub fn get_pixel(&mut self, x: i32, y: i32) -> Result<u32, RenderError> {
        self.bound()?;
        if !self.clip.bounds().contains(x, y) {
            return Err(RenderError::invalid_argument(format!(
                "pixel ({}, {}) is outside the surface",
                x, y
            )));
        }
        self.with_canvas(|canvas| canvas.get_pixel(x, y))
    }

    /// Store a native pixel value, subject to the clip but not the blend mode
    pub fn put_pixel(&mut self, x: i32, y: i32, pixel: u32) -> Result<(), RenderError> {
        self.bound()?;
        self.with_canvas(|canvas| {
            if canvas.clip().visible(x, y) {
                canvas.put_pixel(x, y, pixel);
            }
        })
    }

    /// `coverage * pixel + (1 - coverage) * existing`, per channel
    pub fn blend_pixel(&mut self, x: i32, y: i32, pixel: u32, coverage: f32) -> Result<(), RenderError> {
        self.bound()?;
        self.with_canvas(|canvas| canvas.blend_pixel(x, y, pixel, coverage))
    }

    // ========================================================================
    // Points, lines, rectangles
    // ========================================================================

    /// Fill the whole surface with the draw colour, ignoring clip and blend mode
    pub fn clear(&mut self) -> Result<(), RenderError> {
        self.bound()?;
        self.with_canvas(|canvas| canvas.fill_all())
    }

    pub fn draw_point(&mut self, p: Point) -> Result<(), RenderError> {
        self.bound()?;
        self.with_canvas(|canvas| canvas.plot(p.x, p.y))
    }

    pub fn draw_points(&mut self, points: &[Point]) -> Result<(), RenderError> {
        self.bound()?;
        if points.is_empty() {
            return Ok(());
        }
        self.plot_all(points.iter().copied())
    }

    pub fn draw_line(&mut self, from: Point, to: Point) -> Result<(), RenderError> {
        self.bound()?;
        self.plot_all(LinePixels::clipped(from, to, self.clip.area()))
    }

    /// Connected polyline through every point
    pub fn draw_lines(&mut self, points: &[Point]) -> Result<(), RenderError> {
        self.bound()?;
        if points.is_empty() {
            return Ok(());
        }
        self.plot_all(PolylinePixels::new(points.iter().copied()).clipped(self.clip.area()))
    }

    /// Independent segments from consecutive pairs of points
    pub fn draw_segments(&mut self, points: &[Point]) -> Result<(), RenderError> {
        self.bound()?;
        if points.is_empty() {
            return Ok(());
        }
        if points.len() % 2 != 0 {
            return Err(RenderError::invalid_argument(
                "Segment list needs an even number of points",
            ));
        }
        let area = self.clip.area();
        let lines = points
            .chunks_exact(2)
            .flat_map(|pair| LinePixels::clipped(pair[0], pair[1], area));
        self.plot_all(lines)
    }

    pub fn draw_rect(&mut self, rect: Rect) -> Result<(), RenderError> {
        self.draw_rects(&[rect])
    }

    /// Rectangle outlines; each corner pixel is written once
    pub fn draw_rects(&mut self, rects: &[Rect]) -> Result<(), RenderError> {
        self.bound()?;
        if rects.is_empty() {
            return Ok(());
        }
        self.with_canvas(|canvas| {
            for r in rects.iter().filter(|r| !r.is_empty()) {
                outline_rect(canvas, *r);
            }
        })
    }

    pub fn fill_rect(&mut self, rect: Rect) -> Result<(), RenderError> {
        self.fill_rects(&[rect])
    }

    pub fn fill_rects(&mut self, rects: &[Rect]) -> Result<(), RenderError> {
        self.bound()?;
        if rects.is_empty() {
            return Ok(());
        }
        self.with_canvas(|canvas| {
            for &rect in rects {
                let mut r = rect;
                if !canvas.clip().clip_rect_to_clip(&mut r) {
                    continue;
                }
                for y in r.y..r.bottom() {
                    canvas.fill_span(Span {
                        y,
                        x_start: r.x,
                        x_end: r.right() - 1,
                    });
                }
            }
        })
    }

    /// Xiaolin Wu line with subpixel endpoints
    pub fn draw_line_aa(&mut self, from: FPoint, to: FPoint) -> Result<(), RenderError> {
        self.bound()?;
        let visible = raster::clip_segment(from, to, self.clip.area(), AA_CLIP_MARGIN);
        self.plot_all(visible.into_iter().flat_map(|(a, b)| AaLinePixels::new(a, b)))
    }

    /// Rectangular swath `width` pixels wide
    pub fn draw_line_thick(&mut self, from: Point, to: Point, width: i32) -> Result<(), RenderError> {
        self.bound()?;
        check_width(width)?;
        let spans = raster::thick_line_spans(from, to, width as f32, self.clip.rows());
        self.fill_spans(spans)
    }

    /// Thick line with round caps
    pub fn draw_line_thick_rounded(
        &mut self,
        from: Point,
        to: Point,
        width: i32,
    ) -> Result<(), RenderError> {
        self.bound()?;
        check_width(width)?;
        self.fill_spans(CapsuleSpans::new(from, to, width as f32, self.clip.rows()))
    }

    // ========================================================================
    // Circles, ellipses, arcs
    // ========================================================================

    pub fn draw_circle(&mut self, center: Point, radius: i32) -> Result<(), RenderError> {
        self.bound()?;
        check_radius(center, radius)?;
        self.fill_spans(raster::circle_outline(center, radius, self.clip.rows()))
    }

    pub fn fill_circle(&mut self, center: Point, radius: i32) -> Result<(), RenderError> {
        self.bound()?;
        check_radius(center, radius)?;
        self.fill_spans(raster::filled_circle_spans(center, radius, self.clip.rows()))
    }

    pub fn draw_ellipse(&mut self, center: Point, rx: i32, ry: i32) -> Result<(), RenderError> {
        self.bound()?;
        check_radii(center, rx, ry)?;
        self.fill_spans(raster::ellipse_outline(center, rx, ry, self.clip.rows()))
    }

    pub fn fill_ellipse(&mut self, center: Point, rx: i32, ry: i32) -> Result<(), RenderError> {
        self.bound()?;
        check_radii(center, rx, ry)?;
        self.fill_spans(raster::filled_ellipse_spans(center, rx, ry, self.clip.rows()))
    }

    /// Part of an ellipse outline between two angles, in radians from +x
    /// towards +y. Nothing is drawn when `start > end`.
    pub fn draw_ellipse_arc(
        &mut self,
        center: Point,
        rx: i32,
        ry: i32,
        start: f32,
        end: f32,
    ) -> Result<(), RenderError> {
        self.bound()?;
        check_radii(center, rx, ry)?;
        let samples = raster::arc_samples(
            FPoint::from(center),
            rx as f32,
            ry as f32,
            start,
            end,
            CURVE_TOLERANCE,
        );
        self.plot_all(PolylinePixels::new(samples.map(FPoint::round)).clipped(self.clip.area()))
    }

    // ========================================================================
    // Curves
    // ========================================================================

    pub fn draw_bezier_quad(&mut self, p0: FPoint, p1: FPoint, p2: FPoint) -> Result<(), RenderError> {
        self.bound()?;
        let samples = raster::quadratic_bezier(p0, p1, p2, CURVE_TOLERANCE);
        self.plot_all(PolylinePixels::new(samples.map(FPoint::round)).clipped(self.clip.area()))
    }

    pub fn draw_bezier_cubic(
        &mut self,
        p0: FPoint,
        p1: FPoint,
        p2: FPoint,
        p3: FPoint,
    ) -> Result<(), RenderError> {
        self.bound()?;
        let samples = raster::cubic_bezier(p0, p1, p2, p3, CURVE_TOLERANCE);
        self.plot_all(PolylinePixels::new(samples.map(FPoint::round)).clipped(self.clip.area()))
    }

    /// Clamped uniform B-spline; 3 is the usual degree
    pub fn draw_bspline(&mut self, points: &[FPoint], degree: usize) -> Result<(), RenderError> {
        self.bound()?;
        if points.is_empty() {
            return Ok(());
        }
        if degree == 0 {
            return Err(RenderError::invalid_argument("B-spline degree must be at least 1"));
        }
        let spline = BSpline::new(points, degree).ok_or_else(|| {
            RenderError::invalid_argument("Not enough control points for specified degree")
        })?;
        let samples = spline.samples(CURVE_TOLERANCE).map(FPoint::round);
        self.plot_all(PolylinePixels::new(samples).clipped(self.clip.area()))
    }

    /// Catmull-Rom spline through every point; 0.5 is the usual tension
    pub fn draw_catmull_rom(&mut self, points: &[FPoint], tension: f32) -> Result<(), RenderError> {
        self.bound()?;
        if points.is_empty() {
            return Ok(());
        }
        if points.len() < 2 {
            return Err(RenderError::invalid_argument(
                "Need at least 2 points for Catmull-Rom spline",
            ));
        }
        let samples = raster::catmull_rom(points, tension, CURVE_TOLERANCE);
        self.plot_all(PolylinePixels::new(samples.map(FPoint::round)).clipped(self.clip.area()))
    }

    /// Arbitrary parametric curve, sampled at `steps` evenly spaced values of
    /// t from `t_start` to `t_end` inclusive and joined with straight lines
    pub fn draw_curve(
        &mut self,
        mut f: impl FnMut(f32) -> FPoint,
        t_start: f32,
        t_end: f32,
        steps: usize,
    ) -> Result<(), RenderError> {
        self.bound()?;
        if steps < 2 {
            return Err(RenderError::invalid_argument("Need at least 2 steps for curve"));
        }
        let last = (steps - 1) as f32;
        let samples = (0..steps).map(|i| f(t_start + (t_end - t_start) * (i as f32 / last)).round());
        self.plot_all(PolylinePixels::new(samples).clipped(self.clip.area()))
    }

    // ========================================================================
    // Polygons
    // ========================================================================

    /// Outline through the vertices, optionally closed back to the first
    pub fn draw_polygon(&mut self, vertices: &[FPoint], close: bool) -> Result<(), RenderError> {
        self.bound()?;
        if vertices.is_empty() {
            return Ok(());
        }
        check_outline(vertices)?;
        let first = vertices[0].round();
        let last = vertices[vertices.len() - 1].round();
        // a loop that already ends where it starts is not closed twice
        let closing = Some(first).filter(|_| close && last != first);
        let points = vertices.iter().map(|v| v.round()).chain(closing);
        let outline = PolylinePixels::new(points).clipped(self.clip.area());
        if close {
            self.plot_all(outline.closed())
        } else {
            self.plot_all(outline)
        }
    }

    /// Scanline fill sampled at pixel centres
    pub fn fill_polygon(&mut self, vertices: &[FPoint]) -> Result<(), RenderError> {
        self.bound()?;
        if vertices.is_empty() {
            return Ok(());
        }
        if vertices.len() < 3 {
            return Err(RenderError::invalid_argument(
                "Polygon needs at least 3 vertices to fill",
            ));
        }
        self.fill_spans(PolygonSpans::new(vertices, self.clip.rows()))
    }

    /// Closed outline from antialiased edges
    pub fn draw_polygon_aa(&mut self, vertices: &[FPoint]) -> Result<(), RenderError> {
        self.bound()?;
        if vertices.is_empty() {
            return Ok(());
        }
        check_outline(vertices)?;
        let n = vertices.len();
        let edges = if n > 2 { n } else { n - 1 };
        let area = self.clip.area();
        let pixels = (0..edges)
            .filter_map(|i| {
                raster::clip_segment(vertices[i], vertices[(i + 1) % n], area, AA_CLIP_MARGIN)
            })
            .flat_map(|(a, b)| AaLinePixels::new(a, b));
        self.plot_all(pixels)
    }

    // ========================================================================
    // Gradients and surface compositing
    // ========================================================================

    /// Bilinear blend of four corner colours across `rect`. Corners are
    /// reproduced exactly; a rectangle one pixel wide or tall is filled flat
    /// with `top_left`.
    pub fn fill_rect_gradient(
        &mut self,
        rect: Rect,
        top_left: Color,
        top_right: Color,
        bottom_right: Color,
        bottom_left: Color,
    ) -> Result<(), RenderError> {
        self.bound()?;
        let format = self.format;
        let hard = self.blend_mode == BlendMode::None;
        let corners = if rect.w == 1 || rect.h == 1 {
            [top_left; 4]
        } else {
            [top_left, top_right, bottom_right, bottom_left]
        };
        let param = |offset: i32, extent: i32| {
            if extent > 1 {
                offset as f32 / (extent - 1) as f32
            } else {
                0.0
            }
        };
        self.with_canvas(|canvas| {
            let mut area = rect;
            if !canvas.clip().clip_rect_to_clip(&mut area) {
                return;
            }
            for y in area.y..area.bottom() {
                let ty = param(y - rect.y, rect.h);
                for x in area.x..area.right() {
                    let color = bilinear(&corners, param(x - rect.x, rect.w), ty);
                    if hard || color.a == 255 {
                        canvas.put_pixel(x, y, format.map_rgba(color));
                    } else {
                        canvas.blend_color(x, y, color, f32::from(color.a) / 255.0);
                    }
                }
            }
        })
    }

    /// Composite part of another renderer's surface into this one at `dst`,
    /// converting pixel formats and honouring this renderer's clip.
    /// `None` copies the whole source.
    pub fn blend_surface<T: PixelSurface>(
        &mut self,
        src: &mut SurfaceRenderer<T>,
        src_rect: Option<Rect>,
        dst: Point,
        mode: BlendMode,
    ) -> Result<(), RenderError> {
        self.bound()?;
        let src_bounds = src.clip.bounds();
        let requested = src_rect.unwrap_or(src_bounds);
        let Some(from) = requested.intersection(&src_bounds) else {
            src.bound()?;
            return Ok(());
        };
        let (dst_x, dst_y) = (dst.x + from.x - requested.x, dst.y + from.y - requested.y);
        let (ox, oy) = (from.x - dst_x, from.y - dst_y);

        let src_format = src.format;
        let src_accessor = src.accessor;
        let src_surface = src.surface.as_mut().ok_or(RenderError::InvalidSurface)?;
        let mut src_lock = SurfaceLock::acquire(src_surface)?;
        let src_view = src_lock.view(src_accessor)?;

        self.with_canvas_mode(mode, |canvas| {
            let mut target = Rect::new(dst_x, dst_y, from.w, from.h);
            if !canvas.clip().clip_rect_to_clip(&mut target) {
                return;
            }
            for y in target.y..target.bottom() {
                for x in target.x..target.right() {
                    let pixel = src_view.read((x + ox) as u32, (y + oy) as u32);
                    canvas.apply_blend_mode(x, y, src_format.get_rgba(pixel));
                }
            }
        })
    }
}

fn check_width(width: i32) -> Result<(), RenderError> {
    if width <= 0 {
        return Err(RenderError::invalid_argument("Line width must be positive"));
    }
    Ok(())
}

fn check_radius(center: Point, radius: i32) -> Result<(), RenderError> {
    if radius <= 0 {
        return Err(RenderError::invalid_argument("Circle radius must be positive"));
    }
    if !fits_around(center, radius, radius) {
        return Err(RenderError::invalid_argument("Circle extends past the coordinate range"));
    }
    Ok(())
}

fn check_radii(center: Point, rx: i32, ry: i32) -> Result<(), RenderError> {
    if rx <= 0 || ry <= 0 {
        return Err(RenderError::invalid_argument("Ellipse radii must be positive"));
    }
    if !fits_around(center, rx, ry) {
        return Err(RenderError::invalid_argument("Ellipse extends past the coordinate range"));
    }
    Ok(())
}

/// The bounding box `center +- (rx, ry)` is representable in `i32`
fn fits_around(center: Point, rx: i32, ry: i32) -> bool {
    center.x.checked_sub(rx).is_some()
        && center.x.checked_add(rx).is_some()
        && center.y.checked_sub(ry).is_some()
        && center.y.checked_add(ry).is_some()
}

fn check_outline(vertices: &[FPoint]) -> Result<(), RenderError> {
    if vertices.len() < 2 {
        return Err(RenderError::invalid_argument("Polygon needs at least 2 vertices"));
    }
    Ok(())
}

/// Top and bottom rows as spans, sides as single pixels between them
fn outline_rect(canvas: &mut Canvas<'_>, r: Rect) {
    let (x0, y0) = (r.x, r.y);
    let (x1, y1) = (r.right() - 1, r.bottom() - 1);
    canvas.fill_span(Span { y: y0, x_start: x0, x_end: x1 });
    if y1 > y0 {
        canvas.fill_span(Span { y: y1, x_start: x0, x_end: x1 });
    }
    let rows = canvas.clip().rows();
    for y in (y0 + 1).max(rows.start)..y1.min(rows.end) {
        canvas.fill_span(Span { y, x_start: x0, x_end: x0 });
        if x1 > x0 {
            canvas.fill_span(Span { y, x_start: x1, x_end: x1 });
        }
    }
}

/// Corners in order top-left, top-right, bottom-right, bottom-left
fn bilinear(corners: &[Color; 4], tx: f32, ty: f32) -> Color {
    let [tl, tr, br, bl] = corners.map(Color::channels);
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let top = f32::from(tl[i]) * (1.0 - tx) + f32::from(tr[i]) * tx;
        let bottom = f32::from(bl[i]) * (1.0 - tx) + f32::from(br[i]) * tx;
        *slot = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Color::from_channels(out)
}
