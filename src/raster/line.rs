//! Straight lines: Bresenham, Xiaolin Wu, and thick swaths

use std::ops::Range;

use super::polygon::{centre_rows, centre_span, Edge, PolygonSpans};
use super::{AaPixel, Span};
use crate::geometry::{FPoint, Point, Rect};

/// Bresenham line, both endpoints included, each pixel once
#[derive(Debug, Clone)]
pub struct LinePixels {
    x: i64,
    y: i64,
    x1: i64,
    y1: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    done: bool,
}

impl LinePixels {
    pub fn new(from: Point, to: Point) -> Self {
        let (x0, y0) = (i64::from(from.x), i64::from(from.y));
        let (x1, y1) = (i64::from(to.x), i64::from(to.y));
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }

    /// The pixels of [`LinePixels::new`] that fall inside `area`, found
    /// without stepping through the ones outside it
    pub fn clipped(from: Point, to: Point, area: Rect) -> Self {
        let mut line = Self::new(from, to);
        match line.visible_steps(area) {
            Some((first, last)) => line.skip_to(first, last),
            None => line.done = true,
        }
        line
    }

    /// Pixel `k` along the major axis as (x steps, y steps) taken
    fn steps_at(&self, k: i128) -> (i128, i128) {
        let (dx, dy) = (i128::from(self.dx), -i128::from(self.dy));
        let (major, minor) = (dx.max(dy), dx.min(dy));
        let m = if major == 0 { 0 } else { (2 * minor * k + major).div_euclid(2 * major) };
        if dx >= dy {
            (k, m)
        } else {
            (m, k)
        }
    }

    /// First and last major-axis step whose pixel lies in `area`
    fn visible_steps(&self, area: Rect) -> Option<(i128, i128)> {
        if area.is_empty() {
            return None;
        }
        let (dx, dy) = (i128::from(self.dx), -i128::from(self.dy));
        let xs = steps_within(self.x, self.sx, area.x, area.right() - 1);
        let ys = steps_within(self.y, self.sy, area.y, area.bottom() - 1);
        let (major, minor, major_range, minor_range) = if dx >= dy {
            (dx, dy, xs, ys)
        } else {
            (dy, dx, ys, xs)
        };
        let mut first = major_range.0.max(0);
        let mut last = major_range.1.min(major);
        if minor == 0 {
            if minor_range.0 > 0 || minor_range.1 < 0 {
                return None;
            }
        } else {
            // the minor step count at k is floor((2 minor k + major) / (2 major))
            first = first.max(div_ceil(2 * major * minor_range.0 - major, 2 * minor));
            last = last.min(div_ceil(2 * major * (minor_range.1 + 1) - major, 2 * minor) - 1);
        }
        (first <= last).then_some((first, last))
    }

    /// Move to step `first` and end at step `last`, with the error term the
    /// full walk would have there
    fn skip_to(&mut self, first: i128, last: i128) {
        let (x0, y0) = (i128::from(self.x), i128::from(self.y));
        let (sx, sy) = (i128::from(self.sx), i128::from(self.sy));
        let (dx, dy) = (i128::from(self.dx), i128::from(self.dy));
        let (nx, ny) = self.steps_at(first);
        let (ex, ey) = self.steps_at(last);
        self.x = (x0 + sx * nx) as i64;
        self.y = (y0 + sy * ny) as i64;
        self.x1 = (x0 + sx * ex) as i64;
        self.y1 = (y0 + sy * ey) as i64;
        self.err = (dx * (1 + ny) + dy * (1 + nx)) as i64;
    }
}

/// Inclusive range of step counts `t` with `origin + step * t` in `lo..=hi`
fn steps_within(origin: i64, step: i64, lo: i32, hi: i32) -> (i128, i128) {
    let (o, lo, hi) = (i128::from(origin), i128::from(lo), i128::from(hi));
    if step > 0 {
        (lo - o, hi - o)
    } else {
        (o - hi, o - lo)
    }
}

#[inline]
fn div_ceil(a: i128, b: i128) -> i128 {
    -(-a).div_euclid(b)
}

/// Liang-Barsky clip of a segment against `area` grown by `margin` on every
/// side. Endpoints already inside are returned unchanged.
pub fn clip_segment(from: FPoint, to: FPoint, area: Rect, margin: f32) -> Option<(FPoint, FPoint)> {
    if area.is_empty() {
        return None;
    }
    let m = f64::from(margin);
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
    let left = f64::from(area.x) - m;
    let top = f64::from(area.y) - m;
    let right = f64::from(area.right()) + m;
    let bottom = f64::from(area.bottom()) + m;

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0 - left), (dx, right - x0), (-dy, y0 - top), (dy, bottom - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| FPoint::new((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    let a = if t0 > 0.0 { at(t0) } else { from };
    let b = if t1 < 1.0 { at(t1) } else { to };
    Some((a, b))
}

impl Iterator for LinePixels {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let p = Point::new(self.x as i32, self.y as i32);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(p);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let left = (self.x1 - self.x).abs().max((self.y1 - self.y).abs()) as usize + 1;
        (left, Some(left))
    }
}

#[inline]
fn fpart(v: f32) -> f32 {
    v - v.floor()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Head,
    Body,
    Tail,
    Done,
}

/// Xiaolin Wu antialiased line, yielding two weighted pixels per major-axis step.
/// Zero-coverage pixels are skipped.
#[derive(Debug, Clone)]
pub struct AaLinePixels {
    steep: bool,
    gradient: f32,
    intery: f32,
    x: i32,
    body_end: i32,
    head: [(i32, i32, f32); 2],
    tail: [(i32, i32, f32); 2],
    pending: Option<(i32, i32, f32)>,
    stage: Stage,
}

impl AaLinePixels {
    pub fn new(from: FPoint, to: FPoint) -> Self {
        let (mut x0, mut y0, mut x1, mut y1) = (from.x, from.y, to.x, to.y);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let gradient = if dx.abs() < 0.001 { 1.0 } else { dy / dx };

        let xend = x0.round();
        let yend = y0 + gradient * (xend - x0);
        let xgap = 1.0 - fpart(x0 + 0.5);
        let xpxl1 = xend as i32;
        let ypxl1 = yend.floor() as i32;
        let f = fpart(yend);
        let head = [
            (xpxl1, ypxl1, (1.0 - f) * xgap),
            (xpxl1, ypxl1 + 1, f * xgap),
        ];
        let intery = yend + gradient;

        let xend = x1.round();
        let yend = y1 + gradient * (xend - x1);
        let xgap = fpart(x1 + 0.5);
        let xpxl2 = xend as i32;
        let ypxl2 = yend.floor() as i32;
        let f = fpart(yend);
        let tail = [
            (xpxl2, ypxl2, (1.0 - f) * xgap),
            (xpxl2, ypxl2 + 1, f * xgap),
        ];

        Self {
            steep,
            gradient,
            intery,
            x: xpxl1.saturating_add(1),
            body_end: xpxl2,
            head,
            tail,
            pending: None,
            stage: Stage::Head,
        }
    }

    #[inline]
    fn emit(&self, (major, minor, coverage): (i32, i32, f32)) -> Option<AaPixel> {
        if !(coverage > 0.0) {
            return None;
        }
        let (x, y) = if self.steep { (minor, major) } else { (major, minor) };
        Some(AaPixel {
            x,
            y,
            coverage: coverage.min(1.0),
        })
    }
}

impl Iterator for AaLinePixels {
    type Item = AaPixel;

    fn next(&mut self) -> Option<AaPixel> {
        loop {
            if let Some(p) = self.pending.take() {
                if let Some(px) = self.emit(p) {
                    return Some(px);
                }
            }
            let first = match self.stage {
                Stage::Head => {
                    self.stage = Stage::Body;
                    self.pending = Some(self.head[1]);
                    self.head[0]
                },
                Stage::Body => {
                    if self.x >= self.body_end {
                        self.stage = Stage::Tail;
                        continue;
                    }
                    let f = fpart(self.intery);
                    let ipart = self.intery.floor() as i32;
                    let x = self.x;
                    self.pending = Some((x, ipart + 1, f));
                    self.intery += self.gradient;
                    self.x += 1;
                    (x, ipart, 1.0 - f)
                },
                Stage::Tail => {
                    self.stage = Stage::Done;
                    self.pending = Some(self.tail[1]);
                    self.tail[0]
                },
                Stage::Done => return None,
            };
            if let Some(px) = self.emit(first) {
                return Some(px);
            }
        }
    }
}

/// Centre of the pixel a line endpoint names
#[inline]
fn pixel_centre(p: Point) -> (f64, f64) {
    (f64::from(p.x) + 0.5, f64::from(p.y) + 0.5)
}

/// Rectangle swath `width` pixels across, extending half a pixel past each
/// endpoint so a width-1 axis-aligned swath covers the same pixels as the
/// Bresenham line.
pub fn thick_line_quad(from: Point, to: Point, width: f32) -> [FPoint; 4] {
    let (ax, ay) = pixel_centre(from);
    let (bx, by) = pixel_centre(to);
    let half = f64::from(width) / 2.0;
    let (dx, dy) = (bx - ax, by - ay);
    let len = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = if len > 0.0 { (dx / len, dy / len) } else { (1.0, 0.0) };
    // A single point becomes a width x width square
    let ext = if len > 0.0 { 0.5 } else { half };
    let (nx, ny) = (-uy * half, ux * half);
    let (sx, sy) = (ax - ux * ext, ay - uy * ext);
    let (ex, ey) = (bx + ux * ext, by + uy * ext);
    [
        (sx + nx, sy + ny),
        (ex + nx, ey + ny),
        (ex - nx, ey - ny),
        (sx - nx, sy - ny),
    ]
    .map(|(x, y)| FPoint::new(x as f32, y as f32))
}

/// Spans of a rectangular thick line, limited to `rows`
pub fn thick_line_spans(from: Point, to: Point, width: f32, rows: Range<i32>) -> PolygonSpans {
    PolygonSpans::new(&thick_line_quad(from, to, width), rows)
}

/// Spans of a thick line with round caps: the segment swept by a disc of
/// diameter `width`. Each row is one span since the shape is convex.
#[derive(Debug, Clone)]
pub struct CapsuleSpans {
    ends: [(f64, f64); 2],
    radius: f64,
    sides: Vec<Edge>,
    rows: Range<i32>,
}

impl CapsuleSpans {
    pub fn new(from: Point, to: Point, width: f32, rows: Range<i32>) -> Self {
        let a = pixel_centre(from);
        let b = pixel_centre(to);
        let radius = f64::from(width) / 2.0;
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        let mut sides = Vec::with_capacity(4);
        if len > 0.0 {
            let (nx, ny) = (-dy / len * radius, dx / len * radius);
            let quad = [
                (a.0 + nx, a.1 + ny),
                (b.0 + nx, b.1 + ny),
                (b.0 - nx, b.1 - ny),
                (a.0 - nx, a.1 - ny),
            ];
            for i in 0..4 {
                if let Some(edge) = Edge::new(quad[i], quad[(i + 1) % 4]) {
                    sides.push(edge);
                }
            }
        }
        let rows = centre_rows(a.1.min(b.1) - radius, a.1.max(b.1) + radius, rows);
        Self {
            ends: [a, b],
            radius,
            sides,
            rows,
        }
    }

    fn row_extent(&self, yc: f64) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &(cx, cy) in &self.ends {
            let d = yc - cy;
            if d.abs() <= self.radius {
                let h = (self.radius * self.radius - d * d).sqrt();
                lo = lo.min(cx - h);
                hi = hi.max(cx + h);
            }
        }
        for x in self.sides.iter().filter_map(|e| e.crossing(yc)) {
            lo = lo.min(x);
            hi = hi.max(x);
        }
        (lo <= hi).then_some((lo, hi))
    }
}

impl Iterator for CapsuleSpans {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        while self.rows.start < self.rows.end {
            let y = self.rows.start;
            self.rows.start += 1;
            let span = self
                .row_extent(f64::from(y) + 0.5)
                .and_then(|(lo, hi)| centre_span(y, lo, hi));
            if span.is_some() {
                return span;
            }
        }
        None
    }
}
