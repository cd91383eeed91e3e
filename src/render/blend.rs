//! Per-channel compositing arithmetic
//!
//! Blend modes work on 0-255 integers; coverage blending works on 0.0-1.0
//! floats and rounds once at the end.

use crate::color::{BlendMode, Color};

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255,
/// exact at alpha 0 and 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = u16::from(alpha);
    let result = u16::from(src) * alpha + u16::from(dst) * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Rounded `a * b / 255`
#[inline]
fn scale(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

/// Composite `src` over `dst` under `mode`
pub fn compose(mode: BlendMode, src: Color, dst: Color) -> Color {
    let a = src.a;
    match mode {
        BlendMode::None => src,
        BlendMode::Blend => Color::rgba(
            blend_channel(src.r, dst.r, a),
            blend_channel(src.g, dst.g, a),
            blend_channel(src.b, dst.b, a),
            blend_channel(255, dst.a, a),
        ),
        BlendMode::Add => Color::rgba(
            dst.r.saturating_add(scale(src.r, a)),
            dst.g.saturating_add(scale(src.g, a)),
            dst.b.saturating_add(scale(src.b, a)),
            dst.a,
        ),
        BlendMode::Modulate => Color::rgba(
            scale(src.r, dst.r),
            scale(src.g, dst.g),
            scale(src.b, dst.b),
            dst.a,
        ),
        BlendMode::Multiply => Color::rgba(
            blend_channel(scale(src.r, dst.r), dst.r, a),
            blend_channel(scale(src.g, dst.g), dst.g, a),
            blend_channel(scale(src.b, dst.b), dst.b, a),
            dst.a,
        ),
    }
}

/// `coverage * src + (1 - coverage) * dst` on all four channels
pub fn mix(src: Color, dst: Color, coverage: f32) -> Color {
    let c = coverage.clamp(0.0, 1.0);
    let lerp = |s: u8, d: u8| (f32::from(s) * c + f32::from(d) * (1.0 - c)).round() as u8;
    Color::rgba(
        lerp(src.r, dst.r),
        lerp(src.g, dst.g),
        lerp(src.b, dst.b),
        lerp(src.a, dst.a),
    )
}
