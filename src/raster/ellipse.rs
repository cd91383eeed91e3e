//! Circles and ellipses, their fills, and sampled elliptical arcs
//!
//! A pixel belongs to the ellipse with radii `rx`, `ry` when its centre lies
//! inside the ellipse with semi-axes `rx + 1/2` and `ry + 1/2`. A fill is all
//! of those pixels; an outline keeps the ones ending their row or column.
//! Both are produced row by row over the requested rows only.

use std::ops::Range;

use super::Span;
use crate::geometry::{FPoint, Point};

/// Pixel-centre membership for an ellipse centred on the origin
#[derive(Debug, Clone, Copy)]
struct Shape {
    rx: i64,
    ry: i64,
    /// `(2 rx + 1)^2`
    a: u128,
    /// `(2 ry + 1)^2`
    b: u128,
}

impl Shape {
    fn new(rx: i32, ry: i32) -> Self {
        let (rx, ry) = (i64::from(rx.max(0)), i64::from(ry.max(0)));
        let a = (2 * rx + 1) as u128;
        let b = (2 * ry + 1) as u128;
        Self { rx, ry, a: a * a, b: b * b }
    }

    /// `4x^2 b + 4y^2 a <= a b`, the centre test scaled to integers
    fn contains(&self, x: i64, y: i64) -> bool {
        let (x, y) = (u128::from(x.unsigned_abs()), u128::from(y.unsigned_abs()));
        (4 * x * x)
            .checked_mul(self.b)
            .zip((4 * y * y).checked_mul(self.a))
            .and_then(|(p, q)| p.checked_add(q))
            .is_some_and(|lhs| lhs <= self.a * self.b)
    }

    /// Largest `x` inside on row `dy`, -1 above and below the ellipse
    fn half_width(&self, dy: i64) -> i64 {
        if dy.abs() > self.ry {
            return -1;
        }
        let t = dy as f64 / (self.ry as f64 + 0.5);
        let estimate = (self.rx as f64 + 0.5) * (1.0 - t * t).max(0.0).sqrt();
        let mut w = (estimate as i64).clamp(0, self.rx);
        while w > 0 && !self.contains(w, dy) {
            w -= 1;
        }
        while w < self.rx && self.contains(w + 1, dy) {
            w += 1;
        }
        w
    }
}

/// Row offsets in `-r..=r` that land in `rows` around centre row `cy`
fn row_offsets(cy: i32, r: i64, rows: &Range<i32>) -> Range<i64> {
    let lo = (-r).max(i64::from(rows.start) - i64::from(cy));
    let hi = r.min(i64::from(rows.end) - 1 - i64::from(cy));
    lo..hi + 1
}

#[inline]
fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn offset_span(center: Point, dy: i64, x0: i64, x1: i64) -> Span {
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    Span {
        y: saturate(cy + dy),
        x_start: saturate(cx + x0),
        x_end: saturate(cx + x1),
    }
}

/// One span per row of a filled ellipse
#[derive(Debug, Clone)]
pub struct EllipseSpans {
    center: Point,
    shape: Shape,
    dy: Range<i64>,
}

impl Iterator for EllipseSpans {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let dy = self.dy.next()?;
        let w = self.shape.half_width(dy);
        Some(offset_span(self.center, dy, -w, w))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.dy.size_hint()
    }
}

/// Rows of a filled ellipse that fall in `rows`
pub fn filled_ellipse_spans(center: Point, rx: i32, ry: i32, rows: Range<i32>) -> EllipseSpans {
    let shape = Shape::new(rx, ry);
    EllipseSpans {
        center,
        dy: row_offsets(center.y, shape.ry, &rows),
        shape,
    }
}

/// Rows of a filled circle that fall in `rows`
pub fn filled_circle_spans(center: Point, radius: i32, rows: Range<i32>) -> EllipseSpans {
    filled_ellipse_spans(center, radius, radius, rows)
}

/// Ellipse outline as at most two spans per row, each pixel once.
///
/// A pixel is on the outline when it is the outermost one of its row or of
/// its column, so the outline is symmetric about both axes and, for a
/// circle, under a quarter turn.
#[derive(Debug, Clone)]
pub struct EllipseOutline {
    center: Point,
    shape: Shape,
    dy: Range<i64>,
    pending: Option<Span>,
}

impl Iterator for EllipseOutline {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if let Some(span) = self.pending.take() {
            return Some(span);
        }
        let dy = self.dy.next()?;
        let w = self.shape.half_width(dy);
        let outer = self.shape.half_width(if dy >= 0 { dy + 1 } else { dy - 1 });
        // columns whose outermost pixel sits on this row
        let inner = (outer + 1).min(w);
        if inner == 0 {
            return Some(offset_span(self.center, dy, -w, w));
        }
        self.pending = Some(offset_span(self.center, dy, inner, w));
        Some(offset_span(self.center, dy, -w, -inner))
    }
}

/// Outline rows of an ellipse that fall in `rows`
pub fn ellipse_outline(center: Point, rx: i32, ry: i32, rows: Range<i32>) -> EllipseOutline {
    let shape = Shape::new(rx, ry);
    EllipseOutline {
        center,
        dy: row_offsets(center.y, shape.ry, &rows),
        shape,
        pending: None,
    }
}

/// Outline rows of a circle that fall in `rows`
pub fn circle_outline(center: Point, radius: i32, rows: Range<i32>) -> EllipseOutline {
    ellipse_outline(center, radius, radius, rows)
}

/// Points along an elliptical arc, angles in radians from +x towards +y.
///
/// Chords between consecutive samples stay within `tolerance` of the arc.
/// Nothing is produced when `start > end`.
pub fn arc_samples(
    center: FPoint,
    rx: f32,
    ry: f32,
    start: f32,
    end: f32,
    tolerance: f32,
) -> impl Iterator<Item = FPoint> + Clone {
    let r = rx.abs().max(ry.abs()).max(tolerance);
    let step = 2.0 * (1.0 - tolerance / r).clamp(-1.0, 1.0).acos();
    let sweep = end - start;
    let segments = if !(sweep >= 0.0) {
        0
    } else if step > 0.0 {
        ((sweep / step).ceil() as usize).clamp(1, 4096)
    } else {
        4096
    };
    let count = if sweep >= 0.0 { segments + 1 } else { 0 };
    (0..count).map(move |i| {
        let t = start + sweep * (i as f32 / segments as f32);
        FPoint::new(center.x + rx * t.cos(), center.y + ry * t.sin())
    })
}
