//! Pure pixel and span generators for every primitive
//!
//! Nothing in here touches a surface. Each generator is a plain iterator
//! that can be cloned to restart it; clipping and writing happen in
//! [`crate::render`].

pub mod curve;
pub mod ellipse;
pub mod line;
pub mod polygon;

use std::iter::Peekable;

use crate::geometry::{Point, Rect};

pub use curve::{catmull_rom, cubic_bezier, quadratic_bezier, BSpline, CURVE_TOLERANCE};
pub use ellipse::{
    arc_samples, circle_outline, ellipse_outline, filled_circle_spans, filled_ellipse_spans,
    EllipseOutline, EllipseSpans,
};
pub use line::{
    clip_segment, thick_line_quad, thick_line_spans, AaLinePixels, CapsuleSpans, LinePixels,
};
pub use polygon::PolygonSpans;

/// A pixel with fractional coverage in `(0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AaPixel {
    pub x: i32,
    pub y: i32,
    pub coverage: f32,
}

/// Pixels `x_start..=x_end` of row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub y: i32,
    pub x_start: i32,
    pub x_end: i32,
}

/// Bresenham segments joining consecutive points.
///
/// Pixels where one segment ends and the next begins are produced once. A
/// closed polyline (last point equal to the first) also skips the final
/// pixel, since it is the first one again.
#[derive(Debug, Clone)]
pub struct PolylinePixels<I: Iterator<Item = Point>> {
    points: Peekable<I>,
    first: Option<Point>,
    last: Option<Point>,
    segment: Option<LinePixels>,
    closed: bool,
    area: Option<Rect>,
}

impl<I: Iterator<Item = Point>> PolylinePixels<I> {
    pub fn new(points: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            points: points.into_iter().peekable(),
            first: None,
            last: None,
            segment: None,
            closed: false,
            area: None,
        }
    }

    /// Treat a final point equal to the first as closing the loop
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Only produce pixels inside `area`; segments are clipped, not walked
    pub fn clipped(mut self, area: Rect) -> Self {
        self.area = Some(area);
        self
    }

    fn shows(&self, p: Point) -> bool {
        self.area.map_or(true, |a| a.contains(p.x, p.y))
    }
}

impl<I: Iterator<Item = Point>> Iterator for PolylinePixels<I> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        loop {
            if let Some(p) = self.segment.as_mut().and_then(Iterator::next) {
                let closing = self.closed && Some(p) == self.last && self.points.peek().is_none();
                if closing && Some(p) == self.first {
                    self.segment = None;
                    return None;
                }
                return Some(p);
            }
            self.segment = None;
            let to = self.points.next()?;
            match self.last.replace(to) {
                None => {
                    self.first = Some(to);
                    if self.shows(to) {
                        return Some(to);
                    }
                },
                Some(from) => {
                    let mut line = match self.area {
                        Some(area) => LinePixels::clipped(from, to, area),
                        None => LinePixels::new(from, to),
                    };
                    // the joint was the previous segment's last pixel
                    if self.shows(from) {
                        line.next();
                    }
                    self.segment = Some(line);
                },
            }
        }
    }
}
