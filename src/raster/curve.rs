//! Parametric curves flattened to point samples
//!
//! Each sampler yields points in ascending parameter order, first and last
//! control points included. Consecutive samples are meant to be joined with
//! straight segments (see [`super::PolylinePixels`]).

use crate::geometry::FPoint;

/// Maximum distance, in pixels, between a curve and its flattened chords
pub const CURVE_TOLERANCE: f32 = 0.5;

const MAX_SEGMENTS: usize = 4096;

#[inline]
fn second_difference(a: FPoint, b: FPoint, c: FPoint) -> f32 {
    let x = a.x - 2.0 * b.x + c.x;
    let y = a.y - 2.0 * b.y + c.y;
    (x * x + y * y).sqrt()
}

/// Segment count keeping the chord error of a curve with second derivative
/// bounded by `8 * bound` under `tolerance`
fn segments_for(bound: f32, tolerance: f32) -> usize {
    let n = (bound / tolerance).sqrt().ceil();
    if n.is_finite() {
        (n as usize).clamp(1, MAX_SEGMENTS)
    } else {
        MAX_SEGMENTS
    }
}

fn steps(segments: usize) -> impl Iterator<Item = f32> + Clone {
    (0..=segments).map(move |i| i as f32 / segments as f32)
}

/// Quadratic Bezier through `p0` and `p2`, pulled towards `p1`
pub fn quadratic_bezier(
    p0: FPoint,
    p1: FPoint,
    p2: FPoint,
    tolerance: f32,
) -> impl Iterator<Item = FPoint> + Clone {
    let n = segments_for(second_difference(p0, p1, p2) / 4.0, tolerance);
    steps(n).map(move |t| {
        let u = 1.0 - t;
        let (a, b, c) = (u * u, 2.0 * u * t, t * t);
        FPoint::new(
            a * p0.x + b * p1.x + c * p2.x,
            a * p0.y + b * p1.y + c * p2.y,
        )
    })
}

/// Cubic Bezier from `p0` to `p3` with handles `p1`, `p2`
pub fn cubic_bezier(
    p0: FPoint,
    p1: FPoint,
    p2: FPoint,
    p3: FPoint,
    tolerance: f32,
) -> impl Iterator<Item = FPoint> + Clone {
    let m = second_difference(p0, p1, p2).max(second_difference(p1, p2, p3));
    let n = segments_for(3.0 * m / 4.0, tolerance);
    steps(n).map(move |t| {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        FPoint::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        )
    })
}

/// Clamped uniform B-spline of the given degree.
///
/// The curve starts at the first control point and ends at the last one.
/// Needs `degree >= 1` and at least `degree + 1` control points, otherwise
/// nothing is produced.
#[derive(Debug, Clone)]
pub struct BSpline<'a> {
    points: &'a [FPoint],
    degree: usize,
    knots: Vec<f32>,
}

impl<'a> BSpline<'a> {
    pub fn new(points: &'a [FPoint], degree: usize) -> Option<Self> {
        if degree == 0 || points.len() <= degree {
            return None;
        }
        let n = points.len();
        let inner = n - degree;
        let mut knots = Vec::with_capacity(n + degree + 1);
        knots.extend(std::iter::repeat(0.0).take(degree + 1));
        knots.extend((1..inner).map(|i| i as f32 / inner as f32));
        knots.extend(std::iter::repeat(1.0).take(degree + 1));
        Some(Self {
            points,
            degree,
            knots,
        })
    }

    /// De Boor evaluation at `t` in `[0, 1]`
    pub fn evaluate(&self, t: f32) -> FPoint {
        let p = self.degree;
        let n = self.points.len();
        let t = t.clamp(0.0, 1.0);
        // Knot span k with knots[k] <= t < knots[k + 1], last span for t == 1
        let k = (p..n)
            .rev()
            .find(|&k| self.knots[k] <= t)
            .unwrap_or(p);

        let mut d: Vec<FPoint> = (0..=p).map(|j| self.points[j + k - p]).collect();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = j + k - p;
                let lo = self.knots[i];
                let hi = self.knots[i + p + 1 - r];
                let alpha = if hi > lo { (t - lo) / (hi - lo) } else { 0.0 };
                d[j] = d[j - 1].lerp(d[j], alpha);
            }
        }
        d[p]
    }

    /// Samples spaced by roughly two pixels of control-polygon length
    pub fn samples(&self, tolerance: f32) -> impl Iterator<Item = FPoint> + Clone + '_ {
        let length: f32 = self
            .points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum();
        let n = (length / (4.0 * tolerance)).ceil();
        let n = if n.is_finite() {
            (n as usize).clamp(1, MAX_SEGMENTS)
        } else {
            MAX_SEGMENTS
        };
        steps(n).map(move |t| self.evaluate(t))
    }
}

/// Catmull-Rom spline through every point; `tension` scales the tangents
/// (0.5 is the classic spline, 0 gives straight segments).
///
/// Each span is converted to a cubic Bezier and flattened like one. End
/// tangents reuse the end point in place of the missing neighbour.
pub fn catmull_rom(
    points: &[FPoint],
    tension: f32,
    tolerance: f32,
) -> impl Iterator<Item = FPoint> + '_ {
    let n = points.len();
    let tangent = move |i: usize| {
        let prev = points[i.saturating_sub(1)];
        let next = points[(i + 1).min(n - 1)];
        FPoint::new((next.x - prev.x) * tension, (next.y - prev.y) * tension)
    };
    (0..n.saturating_sub(1)).flat_map(move |i| {
        let (a, b) = (points[i], points[i + 1]);
        let (ma, mb) = (tangent(i), tangent(i + 1));
        let c1 = FPoint::new(a.x + ma.x / 3.0, a.y + ma.y / 3.0);
        let c2 = FPoint::new(b.x - mb.x / 3.0, b.y - mb.y / 3.0);
        // Later spans start where the previous one ended
        cubic_bezier(a, c1, c2, b, tolerance).skip(usize::from(i > 0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: FPoint, b: FPoint) -> bool {
        a.distance_to(&b) < 1e-3
    }

    #[test]
    fn test_straight_quadratic_is_one_segment() {
        let pts: Vec<FPoint> = quadratic_bezier(
            FPoint::new(0.0, 0.0),
            FPoint::new(5.0, 5.0),
            FPoint::new(10.0, 10.0),
            CURVE_TOLERANCE,
        )
        .collect();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_quadratic_chords_stay_within_tolerance() {
        let (p0, p1, p2) = (FPoint::new(0.0, 0.0), FPoint::new(50.0, 100.0), FPoint::new(100.0, 0.0));
        let pts: Vec<FPoint> = quadratic_bezier(p0, p1, p2, CURVE_TOLERANCE).collect();
        assert!(close(pts[0], p0));
        assert!(close(pts[pts.len() - 1], p2));
        // Apex of the curve is at (50, 50); some chord must pass close to it
        let apex = FPoint::new(50.0, 50.0);
        let nearest = pts.iter().map(|p| p.distance_to(&apex)).fold(f32::MAX, f32::min);
        assert!(nearest <= 5.0);
        assert!(pts.len() > 5);
    }

    #[test]
    fn test_cubic_hits_endpoints() {
        let p = [
            FPoint::new(0.0, 0.0),
            FPoint::new(0.0, 80.0),
            FPoint::new(80.0, 80.0),
            FPoint::new(80.0, 0.0),
        ];
        let pts: Vec<FPoint> = cubic_bezier(p[0], p[1], p[2], p[3], CURVE_TOLERANCE).collect();
        assert!(close(pts[0], p[0]));
        assert!(close(pts[pts.len() - 1], p[3]));
    }

    #[test]
    fn test_bspline_is_clamped_to_end_points() {
        let ctrl = [
            FPoint::new(0.0, 0.0),
            FPoint::new(10.0, 30.0),
            FPoint::new(30.0, 30.0),
            FPoint::new(40.0, 0.0),
            FPoint::new(60.0, 10.0),
        ];
        let spline = BSpline::new(&ctrl, 3).unwrap();
        assert!(close(spline.evaluate(0.0), ctrl[0]));
        assert!(close(spline.evaluate(1.0), ctrl[4]));
        let pts: Vec<FPoint> = spline.samples(CURVE_TOLERANCE).collect();
        assert!(close(pts[0], ctrl[0]));
        assert!(close(pts[pts.len() - 1], ctrl[4]));
    }

    #[test]
    fn test_degree_one_bspline_is_the_control_polygon() {
        let ctrl = [FPoint::new(0.0, 0.0), FPoint::new(10.0, 0.0), FPoint::new(10.0, 10.0)];
        let spline = BSpline::new(&ctrl, 1).unwrap();
        assert!(close(spline.evaluate(0.5), ctrl[1]));
        assert!(close(spline.evaluate(0.25), FPoint::new(5.0, 0.0)));
    }

    #[test]
    fn test_bspline_needs_enough_points() {
        let ctrl = [FPoint::new(0.0, 0.0), FPoint::new(1.0, 1.0), FPoint::new(2.0, 0.0)];
        assert!(BSpline::new(&ctrl, 3).is_none());
        assert!(BSpline::new(&ctrl, 0).is_none());
        assert!(BSpline::new(&ctrl, 2).is_some());
    }

    #[test]
    fn test_catmull_rom_passes_through_every_point() {
        let ctrl = [
            FPoint::new(0.0, 0.0),
            FPoint::new(20.0, 15.0),
            FPoint::new(40.0, -5.0),
            FPoint::new(60.0, 10.0),
        ];
        let pts: Vec<FPoint> = catmull_rom(&ctrl, 0.5, CURVE_TOLERANCE).collect();
        for c in ctrl {
            assert!(pts.iter().any(|p| close(*p, c)), "curve misses {:?}", c);
        }
        // Joins between spans are not repeated
        assert!(pts.windows(2).all(|w| w[0] != w[1]));
    }
}
