//! Scanline polygon fill
//!
//! Rows are sampled at pixel centres: row `y` is tested at `y + 0.5`, and a
//! pixel `x` is inside a span when `x + 0.5` falls in `[left, right)`. An edge
//! takes part in a row when `y_top <= y + 0.5 < y_bottom`, so a vertex shared
//! by two edges is counted once and polygons that share an edge never both
//! claim the same pixel.

use std::ops::Range;

use super::Span;
use crate::geometry::FPoint;

/// A non-horizontal polygon edge, stored top endpoint first
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    x_top: f64,
    y_top: f64,
    y_bottom: f64,
    dx_dy: f64,
}

impl Edge {
    pub(crate) fn new(a: (f64, f64), b: (f64, f64)) -> Option<Self> {
        let (top, bottom) = if a.1 <= b.1 { (a, b) } else { (b, a) };
        // Horizontal (and NaN) edges never cross a sample row
        if !(top.1 < bottom.1) {
            return None;
        }
        Some(Self {
            x_top: top.0,
            y_top: top.1,
            y_bottom: bottom.1,
            dx_dy: (bottom.0 - top.0) / (bottom.1 - top.1),
        })
    }

    #[inline]
    pub(crate) fn crossing(&self, yc: f64) -> Option<f64> {
        if self.y_top <= yc && yc < self.y_bottom {
            Some(self.x_top + (yc - self.y_top) * self.dx_dy)
        } else {
            None
        }
    }
}

/// First and last pixel whose centres lie in `[left, right)`
#[inline]
pub(crate) fn centre_span(y: i32, left: f64, right: f64) -> Option<Span> {
    let x_start = (left - 0.5).ceil();
    let x_end = (right - 0.5).ceil() - 1.0;
    if !(x_end >= x_start) {
        return None;
    }
    Some(Span {
        y,
        x_start: x_start.max(f64::from(i32::MIN)) as i32,
        x_end: x_end.min(f64::from(i32::MAX)) as i32,
    })
}

/// Rows whose centres lie in `[min_y, max_y)`, limited to `limit`
pub(crate) fn centre_rows(min_y: f64, max_y: f64, limit: Range<i32>) -> Range<i32> {
    if !(min_y < max_y) {
        return 0..0;
    }
    let first = (min_y - 0.5).ceil().max(f64::from(limit.start));
    let end = (max_y - 0.5).ceil().min(f64::from(limit.end));
    if first >= end {
        return 0..0;
    }
    first as i32..end as i32
}

/// Horizontal spans covering a polygon, ascending by row
#[derive(Debug, Clone)]
pub struct PolygonSpans {
    edges: Vec<Edge>,
    rows: Range<i32>,
    crossings: Vec<f64>,
    pair: usize,
    y: i32,
}

impl PolygonSpans {
    /// Spans for rows inside `rows`; the polygon is closed implicitly
    pub fn new(vertices: &[FPoint], rows: Range<i32>) -> Self {
        let n = vertices.len();
        let mut edges = Vec::with_capacity(n);
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (i, v) in vertices.iter().enumerate() {
            let w = vertices[(i + 1) % n];
            min_y = min_y.min(f64::from(v.y));
            max_y = max_y.max(f64::from(v.y));
            if let Some(edge) = Edge::new(
                (f64::from(v.x), f64::from(v.y)),
                (f64::from(w.x), f64::from(w.y)),
            ) {
                edges.push(edge);
            }
        }
        let rows = if n < 3 { 0..0 } else { centre_rows(min_y, max_y, rows) };
        Self {
            edges,
            y: rows.start,
            rows,
            crossings: Vec::with_capacity(n),
            pair: 0,
        }
    }

    fn load_row(&mut self) {
        let yc = f64::from(self.y) + 0.5;
        self.crossings.clear();
        self.crossings
            .extend(self.edges.iter().filter_map(|e| e.crossing(yc)));
        self.crossings.sort_unstable_by(f64::total_cmp);
        self.pair = 0;
    }
}

impl Iterator for PolygonSpans {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        loop {
            while self.pair + 1 < self.crossings.len() {
                let (l, r) = (self.crossings[self.pair], self.crossings[self.pair + 1]);
                self.pair += 2;
                if let Some(span) = centre_span(self.y - 1, l, r) {
                    return Some(span);
                }
            }
            if self.y >= self.rows.end {
                return None;
            }
            self.load_row();
            self.y += 1;
        }
    }
}
