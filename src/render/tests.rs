use std::collections::HashSet;

use super::*;
use crate::surface::PixelSurface;

fn renderer(width: u32, height: u32) -> SurfaceRenderer<MemorySurface> {
    SurfaceRenderer::with_new_surface(width, height, PixelFormat::ARGB8888).unwrap()
}

fn bytes(r: &SurfaceRenderer<MemorySurface>) -> Vec<u8> {
    r.surface().unwrap().as_bytes().to_vec()
}

fn rgba(r: &SurfaceRenderer<MemorySurface>, x: i32, y: i32) -> Color {
    r.surface().unwrap().get_rgba(x, y).unwrap()
}

/// Coordinates of every pixel that is no longer zero
fn lit(r: &SurfaceRenderer<MemorySurface>) -> HashSet<(i32, i32)> {
    let s = r.surface().unwrap();
    let mut out = HashSet::new();
    for y in 0..s.height() as i32 {
        for x in 0..s.width() as i32 {
            if s.get_native(x, y) != Some(0) {
                out.insert((x, y));
            }
        }
    }
    out
}

/// Refuses every lock, like a surface whose device went away
struct FlakySurface {
    inner: MemorySurface,
    lock_attempts: usize,
}

impl PixelSurface for FlakySurface {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn pitch(&self) -> usize {
        self.inner.pitch()
    }

    fn format(&self) -> PixelFormat {
        self.inner.format()
    }

    fn lock(&mut self) -> Result<(), String> {
        self.lock_attempts += 1;
        Err("device lost".into())
    }

    fn unlock(&mut self) {
        panic!("unlock without a successful lock");
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        self.inner.pixels_mut()
    }
}

#[test]
fn test_horizontal_line_writes_every_pixel_once() {
    let mut r = renderer(16, 4);
    r.draw_line(Point::new(0, 0), Point::new(10, 0)).unwrap();
    let expected: HashSet<_> = (0..=10).map(|x| (x, 0)).collect();
    assert_eq!(lit(&r), expected);
    assert_eq!(rgba(&r, 5, 0), Color::WHITE);
}

#[test]
fn test_segments_and_polyline() {
    let mut r = renderer(16, 16);
    r.draw_segments(&[Point::new(0, 0), Point::new(3, 0), Point::new(0, 5), Point::new(0, 7)])
        .unwrap();
    assert_eq!(lit(&r).len(), 4 + 3);

    let mut r = renderer(16, 16);
    r.draw_lines(&[Point::new(0, 0), Point::new(4, 0), Point::new(4, 4)]).unwrap();
    assert_eq!(lit(&r).len(), 9);
}

#[test]
fn test_clip_rect_limits_writes() {
    let mut r = renderer(12, 12);
    r.set_clip_rect(Some(Rect::new(2, 3, 4, 5)));
    r.fill_rect(Rect::new(-10, -10, 40, 40)).unwrap();
    r.draw_line(Point::new(0, 0), Point::new(11, 11)).unwrap();
    r.fill_circle(Point::new(6, 6), 9).unwrap();
    let expected: HashSet<_> = (3..8).flat_map(|y| (2..6).map(move |x| (x, y))).collect();
    assert_eq!(lit(&r), expected);
}

#[test]
fn test_clip_rect_is_clamped_to_the_surface() {
    let mut r = renderer(8, 8);
    r.set_clip_rect(Some(Rect::new(-5, -5, 10, 10)));
    assert_eq!(r.clip_rect(), Some(Rect::new(0, 0, 5, 5)));
    assert!(r.is_clip_enabled());
    assert!(r.clip_point(4, 4));
    assert!(!r.clip_point(5, 4));

    let mut rect = Rect::new(3, 3, 10, 1);
    assert!(r.clip_rect_to_clip(&mut rect));
    assert_eq!(rect, Rect::new(3, 3, 2, 1));

    r.reset_clip_rect();
    assert_eq!(r.clip_rect(), None);
    assert!(r.clip_point(100, 100));
}

#[test]
fn test_everything_clipped_is_a_no_op() {
    let mut r = renderer(8, 8);
    r.draw_line(Point::new(-10, -10), Point::new(-5, -20)).unwrap();
    r.fill_circle(Point::new(100, 100), 5).unwrap();
    r.draw_ellipse(Point::new(-50, 4), 10, 3).unwrap();
    r.fill_rect(Rect::new(8, 0, 3, 3)).unwrap();
    assert!(lit(&r).is_empty());
}

#[test]
fn test_writes_stay_inside_the_rows() {
    let surface = MemorySurface::with_pitch(10, 10, 10 * 4 + 12, PixelFormat::ARGB8888).unwrap();
    let mut r = SurfaceRenderer::new(surface).unwrap();
    r.set_draw_color(Color::rgb(255, 0, 255));
    r.draw_line(Point::new(-50, -3), Point::new(60, 12)).unwrap();
    r.draw_line_aa(FPoint::new(-4.2, 9.7), FPoint::new(14.9, 0.3)).unwrap();
    r.draw_line_thick(Point::new(-5, 5), Point::new(20, 5), 5).unwrap();
    r.draw_line_thick_rounded(Point::new(9, -2), Point::new(9, 12), 4).unwrap();
    r.fill_circle(Point::new(9, 9), 6).unwrap();
    r.draw_ellipse(Point::new(5, 5), 20, 3).unwrap();
    r.draw_bezier_cubic(
        FPoint::new(-10.0, 0.0),
        FPoint::new(30.0, 5.0),
        FPoint::new(-20.0, 8.0),
        FPoint::new(25.0, 15.0),
    )
    .unwrap();
    r.fill_polygon(&[FPoint::new(8.0, -4.0), FPoint::new(16.0, 4.0), FPoint::new(4.0, 14.0)])
        .unwrap();
    r.fill_rect_gradient(Rect::new(-3, -3, 20, 20), Color::BLACK, Color::WHITE, Color::BLACK, Color::WHITE)
        .unwrap();

    let s = r.surface().unwrap();
    let pitch = s.pitch();
    for (y, row) in s.as_bytes().chunks(pitch).enumerate() {
        assert!(row[40..].iter().all(|&b| b == 0), "padding of row {} was written", y);
    }
}

#[test]
fn test_circle_is_symmetric_under_quarter_turns() {
    let mut r = renderer(100, 100);
    r.draw_circle(Point::new(50, 50), 10).unwrap();
    let pixels = lit(&r);
    assert!(pixels.contains(&(60, 50)));
    assert!(pixels.contains(&(50, 40)));
    for &(x, y) in &pixels {
        let turned = (50 - (y - 50), 50 + (x - 50));
        assert!(pixels.contains(&turned), "({}, {}) has no rotated partner", x, y);
    }
}

#[test]
fn test_huge_radii_stay_inside_the_coordinate_range() {
    let mut r = renderer(64, 64);
    let before = bytes(&r);
    let calls = [
        r.draw_circle(Point::new(32, 32), i32::MAX),
        r.fill_circle(Point::new(32, 32), i32::MAX),
        r.draw_ellipse(Point::new(32, 32), 10, i32::MAX),
        r.fill_ellipse(Point::new(-5, 32), i32::MAX, 3),
        r.draw_ellipse_arc(Point::new(32, 32), i32::MAX, 4, 0.0, 1.0),
    ];
    for result in calls {
        assert!(matches!(result, Err(RenderError::InvalidArgument(_))), "{:?}", result);
    }
    assert_eq!(bytes(&r), before);

    // Only the two flat caps of this ellipse cross the surface
    r.draw_ellipse(Point::new(32, 32), 2_000_000_000, 1).unwrap();
    let caps: HashSet<_> = [31, 33].iter().flat_map(|&y| (0..64).map(move |x| (x, y))).collect();
    assert_eq!(lit(&r), caps);

    let mut r = renderer(64, 64);
    r.fill_ellipse(Point::new(32, 32), 2_000_000_000, 1).unwrap();
    assert_eq!(lit(&r).len(), 3 * 64);

    let mut r = renderer(64, 64);
    r.draw_circle(Point::new(32, 32), 1_000_000_000).unwrap();
    assert!(lit(&r).is_empty());
    r.fill_circle(Point::new(32, 32), 1_000_000_000).unwrap();
    assert_eq!(lit(&r).len(), 64 * 64);
}

#[test]
fn test_lines_with_far_endpoints_are_clipped() {
    let mut r = renderer(64, 64);
    r.draw_line(Point::new(-300_000_000, 10), Point::new(300_000_000, 20)).unwrap();
    let row: HashSet<_> = (0..64).map(|x| (x, 15)).collect();
    assert_eq!(lit(&r), row);

    let (a, b) = (Point::new(-400, -90), Point::new(500, 170));
    let mut r = renderer(64, 64);
    r.draw_line(a, b).unwrap();
    let walked: HashSet<_> = LinePixels::new(a, b)
        .filter(|p| (0..64).contains(&p.x) && (0..64).contains(&p.y))
        .map(|p| (p.x, p.y))
        .collect();
    assert!(!walked.is_empty());
    assert_eq!(lit(&r), walked);

    let mut r = renderer(64, 64);
    r.set_clip_rect(Some(Rect::new(8, 8, 40, 40)));
    r.draw_lines(&[
        Point::new(-200_000_000, 20),
        Point::new(200_000_000, 24),
        Point::new(20, 200_000_000),
    ])
    .unwrap();
    r.draw_segments(&[Point::new(30, -500_000_000), Point::new(30, 500_000_000)]).unwrap();
    r.draw_line_aa(FPoint::new(-3.0e8, 30.5), FPoint::new(3.0e8, 30.5)).unwrap();
    let pixels = lit(&r);
    for p in [(30, 8), (30, 47), (8, 30), (47, 31), (20, 22)] {
        assert!(pixels.contains(&p), "missing {:?}", p);
    }
    assert!(pixels.iter().all(|&(x, y)| (8..48).contains(&x) && (8..48).contains(&y)));
}

#[test]
fn test_filled_circle_matches_its_outline_extent() {
    let mut outline = renderer(21, 21);
    outline.draw_circle(Point::new(10, 10), 6).unwrap();
    let mut filled = renderer(21, 21);
    filled.fill_circle(Point::new(10, 10), 6).unwrap();
    let filled = lit(&filled);
    for p in lit(&outline) {
        assert!(filled.contains(&p), "{:?} outside the fill", p);
    }
}

#[test]
fn test_convex_fill_equals_its_fan() {
    let pentagon = [
        FPoint::new(10.0, 2.0),
        FPoint::new(18.0, 8.0),
        FPoint::new(15.0, 18.0),
        FPoint::new(5.0, 18.0),
        FPoint::new(2.0, 8.0),
    ];
    let mut whole = renderer(20, 20);
    whole.fill_polygon(&pentagon).unwrap();

    let mut fan = renderer(20, 20);
    for i in 1..pentagon.len() - 1 {
        fan.fill_polygon(&[pentagon[0], pentagon[i], pentagon[i + 1]]).unwrap();
    }
    assert!(!lit(&whole).is_empty());
    assert_eq!(bytes(&whole), bytes(&fan));
}

#[test]
fn test_closed_polygon_outline() {
    let square = [
        FPoint::new(1.0, 1.0),
        FPoint::new(5.0, 1.0),
        FPoint::new(5.0, 5.0),
        FPoint::new(1.0, 5.0),
    ];
    let mut closed = renderer(8, 8);
    closed.draw_polygon(&square, true).unwrap();
    assert_eq!(lit(&closed).len(), 16);

    let mut open = renderer(8, 8);
    open.draw_polygon(&square, false).unwrap();
    assert_eq!(lit(&open).len(), 13);
}

#[test]
fn test_closing_a_loop_that_already_closes_writes_the_start_once() {
    let (a, b, c) = (FPoint::new(1.0, 1.0), FPoint::new(6.0, 1.0), FPoint::new(3.0, 5.0));
    let mut looped = renderer(8, 8);
    looped.set_blend_mode(BlendMode::Add);
    looped.set_draw_color(Color::rgb(10, 10, 10));
    looped.draw_polygon(&[a, b, c, a], true).unwrap();
    for (x, y) in lit(&looped) {
        assert_eq!(rgba(&looped, x, y).r, 10, "({}, {}) written twice", x, y);
    }

    let mut plain = renderer(8, 8);
    plain.set_blend_mode(BlendMode::Add);
    plain.set_draw_color(Color::rgb(10, 10, 10));
    plain.draw_polygon(&[a, b, c], true).unwrap();
    assert_eq!(bytes(&looped), bytes(&plain));
}

#[test]
fn test_rect_outline_writes_corners_once() {
    let mut r = renderer(8, 8);
    r.set_blend_mode(BlendMode::Add);
    r.set_draw_color(Color::rgb(10, 10, 10));
    r.draw_rect(Rect::new(1, 1, 4, 3)).unwrap();
    assert_eq!(lit(&r).len(), 10);
    for &(x, y) in &[(1, 1), (4, 1), (1, 3), (4, 3), (2, 2)] {
        let expected = if (x, y) == (2, 2) { 0 } else { 10 };
        assert_eq!(rgba(&r, x, y).r, expected, "at ({}, {})", x, y);
    }
}

#[test]
fn test_thick_line_covers_width_rows() {
    let mut r = renderer(16, 12);
    r.draw_line_thick(Point::new(2, 5), Point::new(12, 5), 3).unwrap();
    let expected: HashSet<_> = (4..=6).flat_map(|y| (2..=12).map(move |x| (x, y))).collect();
    assert_eq!(lit(&r), expected);
}

#[test]
fn test_antialiased_line_stays_near_its_path() {
    let mut r = renderer(12, 8);
    r.draw_line_aa(FPoint::new(1.0, 3.0), FPoint::new(10.0, 4.0)).unwrap();
    let pixels = lit(&r);
    assert!(!pixels.is_empty());
    assert!(pixels.iter().all(|&(_, y)| (2..=5).contains(&y)));
}

#[test]
fn test_blend_pixel_round_trip() {
    let mut r = renderer(4, 4);
    let format = r.format();
    let blue = format.map_rgba(Color::rgb(0, 0, 255));
    let red = format.map_rgba(Color::rgb(255, 0, 0));

    r.put_pixel(0, 0, blue).unwrap();
    r.blend_pixel(0, 0, red, 1.0).unwrap();
    assert_eq!(r.get_pixel(0, 0).unwrap(), red);

    r.put_pixel(1, 0, blue).unwrap();
    r.blend_pixel(1, 0, red, 0.0).unwrap();
    assert_eq!(r.get_pixel(1, 0).unwrap(), blue);
}

#[test]
fn test_half_alpha_blend_mode() {
    let mut r = renderer(4, 4);
    r.set_draw_color(Color::rgb(0, 0, 255));
    r.clear().unwrap();
    r.set_draw_color(Color::rgba(255, 0, 0, 128));
    r.set_blend_mode(BlendMode::Blend);
    r.draw_point(Point::new(1, 1)).unwrap();
    let c = rgba(&r, 1, 1);
    assert!((127..=129).contains(&c.r));
    assert!((126..=128).contains(&c.b));
    assert_eq!(c.a, 255);
    assert_eq!(rgba(&r, 0, 0), Color::rgb(0, 0, 255));
}

#[test]
fn test_gradient_reproduces_its_corners() {
    let mut r = renderer(10, 8);
    let (tl, tr, br, bl) = (
        Color::rgb(255, 0, 0),
        Color::rgb(0, 255, 0),
        Color::rgb(0, 0, 255),
        Color::rgb(255, 255, 255),
    );
    r.fill_rect_gradient(Rect::new(1, 1, 8, 6), tl, tr, br, bl).unwrap();
    assert_eq!(rgba(&r, 1, 1), tl);
    assert_eq!(rgba(&r, 8, 1), tr);
    assert_eq!(rgba(&r, 8, 6), br);
    assert_eq!(rgba(&r, 1, 6), bl);
    assert_eq!(rgba(&r, 0, 0), Color::TRANSPARENT);
    assert_eq!(lit(&r).len(), 48);
}

#[test]
fn test_gradient_keeps_unclipped_parameters() {
    let mut whole = renderer(10, 10);
    let corners = [Color::rgb(0, 0, 0), Color::rgb(200, 0, 0), Color::rgb(200, 100, 0), Color::rgb(0, 100, 0)];
    let rect = Rect::new(0, 0, 10, 10);
    whole
        .fill_rect_gradient(rect, corners[0], corners[1], corners[2], corners[3])
        .unwrap();

    let mut clipped = renderer(10, 10);
    clipped.set_clip_rect(Some(Rect::new(3, 3, 4, 4)));
    clipped
        .fill_rect_gradient(rect, corners[0], corners[1], corners[2], corners[3])
        .unwrap();
    assert_eq!(rgba(&clipped, 5, 4), rgba(&whole, 5, 4));
    assert_eq!(rgba(&clipped, 2, 2), Color::TRANSPARENT);
}

#[test]
fn test_one_pixel_gradient_is_flat() {
    let mut r = renderer(8, 8);
    let (tl, tr, br, bl) = (
        Color::rgb(200, 0, 0),
        Color::rgb(0, 200, 0),
        Color::rgb(0, 0, 200),
        Color::rgb(90, 90, 90),
    );
    r.fill_rect_gradient(Rect::new(2, 1, 1, 5), tl, tr, br, bl).unwrap();
    r.fill_rect_gradient(Rect::new(0, 7, 6, 1), tl, tr, br, bl).unwrap();
    for y in 1..6 {
        assert_eq!(rgba(&r, 2, y), tl);
    }
    for x in 0..6 {
        assert_eq!(rgba(&r, x, 7), tl);
    }
    assert_eq!(lit(&r).len(), 11);
}

#[test]
fn test_invalid_arguments_leave_the_surface_untouched() {
    let mut r = renderer(16, 16);
    r.fill_rect(Rect::new(2, 2, 3, 3)).unwrap();
    let before = bytes(&r);
    let p = FPoint::new(1.0, 1.0);

    let calls: Vec<Result<(), RenderError>> = vec![
        r.draw_circle(Point::new(5, 5), 0),
        r.fill_circle(Point::new(5, 5), -2),
        r.draw_ellipse(Point::new(5, 5), 3, 0),
        r.fill_ellipse(Point::new(5, 5), 0, 3),
        r.draw_ellipse_arc(Point::new(5, 5), 0, 3, 0.0, 1.0),
        r.draw_line_thick(Point::new(0, 0), Point::new(5, 5), 0),
        r.draw_line_thick_rounded(Point::new(0, 0), Point::new(5, 5), -1),
        r.draw_segments(&[Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]),
        r.fill_polygon(&[p, FPoint::new(9.0, 9.0)]),
        r.draw_polygon(&[p], true),
        r.draw_polygon_aa(&[p]),
        r.draw_bspline(&[p, p, p], 0),
        r.draw_bspline(&[p, p, p], 3),
        r.draw_catmull_rom(&[p], 0.5),
        r.draw_curve(|t| FPoint::new(t, t), 0.0, 1.0, 1),
    ];
    for result in calls {
        assert!(matches!(result, Err(RenderError::InvalidArgument(_))), "{:?}", result);
    }
    assert!(r.get_pixel(16, 0).is_err());
    assert_eq!(bytes(&r), before);
}

#[test]
fn test_empty_inputs_draw_nothing() {
    let mut r = renderer(16, 16);
    r.draw_points(&[]).unwrap();
    r.draw_lines(&[]).unwrap();
    r.draw_segments(&[]).unwrap();
    r.draw_rects(&[]).unwrap();
    r.fill_rects(&[]).unwrap();
    r.fill_polygon(&[]).unwrap();
    r.draw_polygon(&[], true).unwrap();
    r.draw_bspline(&[], 3).unwrap();
    r.draw_catmull_rom(&[], 0.5).unwrap();
    r.draw_rect(Rect::new(3, 3, 0, 5)).unwrap();
    r.fill_rect(Rect::new(3, 3, 5, -1)).unwrap();
    r.draw_ellipse_arc(Point::new(8, 8), 5, 5, 2.0, 1.0).unwrap();
    assert!(lit(&r).is_empty());
}

#[test]
fn test_curves_reach_their_endpoints() {
    let mut r = renderer(32, 32);
    r.draw_bezier_quad(FPoint::new(2.0, 2.0), FPoint::new(16.0, 30.0), FPoint::new(29.0, 3.0))
        .unwrap();
    let pixels = lit(&r);
    assert!(pixels.contains(&(2, 2)));
    assert!(pixels.contains(&(29, 3)));

    let mut r = renderer(32, 32);
    let knots = [
        FPoint::new(2.0, 20.0),
        FPoint::new(10.0, 5.0),
        FPoint::new(20.0, 25.0),
        FPoint::new(29.0, 8.0),
    ];
    r.draw_catmull_rom(&knots, 0.5).unwrap();
    let pixels = lit(&r);
    for k in &knots {
        assert!(pixels.contains(&(k.x as i32, k.y as i32)), "missed knot {:?}", k);
    }

    let mut r = renderer(32, 32);
    r.draw_bspline(&knots, 3).unwrap();
    let pixels = lit(&r);
    assert!(pixels.contains(&(2, 20)));
    assert!(pixels.contains(&(29, 8)));
}

#[test]
fn test_parametric_curve_samples_inclusive_range() {
    let mut r = renderer(16, 16);
    r.draw_curve(|t| FPoint::new(t, 2.0 * t), 0.0, 6.0, 4).unwrap();
    let pixels = lit(&r);
    assert!(pixels.contains(&(0, 0)));
    assert!(pixels.contains(&(6, 12)));
}

#[test]
fn test_unbound_renderer_refuses_to_draw() {
    let mut r = renderer(8, 8);
    let surface = r.unbind().unwrap();
    assert!(!r.is_bound());
    assert!(r.surface().is_none());
    assert!(matches!(r.clear(), Err(RenderError::InvalidSurface)));
    assert!(matches!(
        r.draw_line(Point::new(0, 0), Point::new(3, 3)),
        Err(RenderError::InvalidSurface)
    ));
    assert!(matches!(r.draw_points(&[]), Err(RenderError::InvalidSurface)));
    assert!(surface.as_bytes().iter().all(|&b| b == 0));
}

#[test_log::test]
fn test_lock_failure_writes_nothing() {
    let inner = MemorySurface::new(8, 8, PixelFormat::ARGB8888).unwrap();
    let before = inner.as_bytes().to_vec();
    let mut r = SurfaceRenderer::new(FlakySurface { inner, lock_attempts: 0 }).unwrap();
    let (p, q) = (Point::new(1, 1), Point::new(6, 5));
    let f = |x: f32, y: f32| FPoint::new(x, y);
    let tri = [f(1.0, 1.0), f(6.0, 2.0), f(3.0, 6.0)];
    let square = Rect::new(1, 1, 4, 4);

    let calls: Vec<Result<(), RenderError>> = vec![
        r.clear(),
        r.put_pixel(2, 2, 0xFFFF_FFFF),
        r.get_pixel(2, 2).map(drop),
        r.blend_pixel(2, 2, 0xFFFF_FFFF, 0.5),
        r.draw_point(p),
        r.draw_points(&[p, q]),
        r.draw_line(p, q),
        r.draw_lines(&[p, q, Point::new(1, 6)]),
        r.draw_segments(&[p, q]),
        r.draw_rect(square),
        r.draw_rects(&[square]),
        r.fill_rect(square),
        r.fill_rects(&[square]),
        r.draw_line_aa(f(1.0, 1.0), f(6.5, 4.2)),
        r.draw_line_thick(p, q, 3),
        r.draw_line_thick_rounded(p, q, 3),
        r.draw_circle(Point::new(4, 4), 3),
        r.fill_circle(Point::new(4, 4), 3),
        r.draw_ellipse(Point::new(4, 4), 3, 2),
        r.fill_ellipse(Point::new(4, 4), 3, 2),
        r.draw_ellipse_arc(Point::new(4, 4), 3, 2, 0.0, 1.5),
        r.draw_bezier_quad(tri[0], tri[1], tri[2]),
        r.draw_bezier_cubic(tri[0], tri[1], tri[2], f(7.0, 7.0)),
        r.draw_bspline(&tri, 2),
        r.draw_catmull_rom(&tri, 0.5),
        r.draw_curve(|t| f(t, t), 0.0, 6.0, 8),
        r.draw_polygon(&tri, true),
        r.fill_polygon(&tri),
        r.draw_polygon_aa(&tri),
        r.fill_rect_gradient(square, Color::BLACK, Color::WHITE, Color::BLACK, Color::WHITE),
    ];
    let attempts = calls.len();
    for (i, result) in calls.into_iter().enumerate() {
        assert!(matches!(result, Err(RenderError::LockFailed(_))), "call {}: {:?}", i, result);
    }
    // Rejected before any lock is attempted
    assert!(matches!(
        r.draw_circle(Point::new(3, 3), 0),
        Err(RenderError::InvalidArgument(_))
    ));

    let surface = r.into_surface().unwrap();
    assert_eq!(surface.lock_attempts, attempts);
    assert_eq!(surface.inner.as_bytes(), &before[..]);
}

#[test_log::test]
fn test_blend_surface_unlocks_the_source_when_the_destination_fails() {
    let mut src = renderer(4, 4);
    src.clear().unwrap();
    let inner = MemorySurface::new(8, 8, PixelFormat::ARGB8888).unwrap();
    let mut dst = SurfaceRenderer::new(FlakySurface { inner, lock_attempts: 0 }).unwrap();

    let result = dst.blend_surface(&mut src, None, Point::new(1, 1), BlendMode::None);
    assert!(matches!(result, Err(RenderError::LockFailed(_))), "{:?}", result);
    assert!(!src.surface().unwrap().is_locked());
    src.draw_point(Point::new(0, 0)).unwrap();

    let dst = dst.into_surface().unwrap();
    assert_eq!(dst.lock_attempts, 1);
    assert!(dst.inner.as_bytes().iter().all(|&b| b == 0));
}

#[test_log::test]
fn test_blend_surface_converts_formats() {
    let mut src = SurfaceRenderer::with_new_surface(4, 4, PixelFormat::RGB565).unwrap();
    src.set_draw_color(Color::rgb(255, 0, 0));
    src.clear().unwrap();

    let mut dst = renderer(8, 8);
    dst.blend_surface(&mut src, None, Point::new(2, 2), BlendMode::None).unwrap();
    let expected: HashSet<_> = (2..6).flat_map(|y| (2..6).map(move |x| (x, y))).collect();
    assert_eq!(lit(&dst), expected);
    assert_eq!(rgba(&dst, 3, 3), Color::rgb(255, 0, 0));
    assert!(!src.surface().unwrap().is_locked());
}

#[test]
fn test_blend_surface_clips_both_sides() {
    let mut src = renderer(4, 4);
    src.clear().unwrap();

    let mut dst = renderer(8, 8);
    dst.blend_surface(&mut src, None, Point::new(-2, -2), BlendMode::Blend).unwrap();
    let expected: HashSet<_> = (0..2).flat_map(|y| (0..2).map(move |x| (x, y))).collect();
    assert_eq!(lit(&dst), expected);

    let mut dst = renderer(8, 8);
    dst.blend_surface(&mut src, Some(Rect::new(-1, -1, 3, 3)), Point::new(0, 0), BlendMode::None)
        .unwrap();
    let expected: HashSet<_> = (1..3).flat_map(|y| (1..3).map(move |x| (x, y))).collect();
    assert_eq!(lit(&dst), expected);

    let mut dst = renderer(8, 8);
    dst.set_clip_rect(Some(Rect::new(0, 0, 3, 8)));
    dst.blend_surface(&mut src, None, Point::new(1, 1), BlendMode::None).unwrap();
    assert_eq!(lit(&dst).len(), 2 * 4);
}

#[test]
fn test_blend_surface_from_unbound_source() {
    let mut src = renderer(4, 4);
    src.unbind();
    let mut dst = renderer(8, 8);
    assert!(matches!(
        dst.blend_surface(&mut src, None, Point::new(0, 0), BlendMode::None),
        Err(RenderError::InvalidSurface)
    ));
}

#[test]
fn test_settings_round_trip() {
    let mut r = renderer(8, 8);
    r.set_draw_color(Color::rgba(1, 2, 3, 4));
    r.set_blend_mode(BlendMode::Modulate);
    r.set_clip_rect(Some(Rect::new(1, 1, 3, 3)));
    let settings = r.settings();

    let mut other = renderer(8, 8);
    other.apply_settings(&settings);
    assert_eq!(other.settings(), settings);
    assert_eq!(other.mapped_color(), r.mapped_color());

    let restored = RenderSettings::from_json(&settings.to_json().unwrap()).unwrap();
    assert_eq!(restored, settings);
}

#[test]
fn test_defaults_and_mapped_color() {
    let mut r = SurfaceRenderer::with_new_surface(4, 4, PixelFormat::RGB565).unwrap();
    assert_eq!(r.draw_color(), Color::WHITE);
    assert_eq!(r.blend_mode(), BlendMode::None);
    assert_eq!(r.clip_rect(), None);
    assert_eq!(r.mapped_color(), 0xFFFF);
    r.set_draw_color(Color::rgb(255, 0, 0));
    assert_eq!(r.mapped_color(), 0xF800);
}
