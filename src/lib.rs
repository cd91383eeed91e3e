//! Software 2D rasterization into locked pixel surfaces.
//!
//! [`SurfaceRenderer`] draws points, lines, rectangles, circles, ellipses,
//! arcs, Bezier and spline curves, polygons and gradients straight into the
//! memory of a [`PixelSurface`], under a clip rectangle and one of the
//! [`BlendMode`]s. The pixel and span generators behind it live in
//! [`raster`] and can be used on their own.
//!
//! ```
//! use softraster::{Color, PixelFormat, Point, SurfaceRenderer};
//!
//! let mut r = SurfaceRenderer::with_new_surface(64, 64, PixelFormat::ARGB8888)?;
//! r.set_draw_color(Color::rgb(255, 128, 0));
//! r.draw_line(Point::new(0, 0), Point::new(63, 40))?;
//! r.fill_circle(Point::new(32, 32), 10)?;
//! # Ok::<(), softraster::RenderError>(())
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod render;
pub mod surface;

pub use color::{BlendMode, Color};
pub use config::RenderSettings;
pub use error::RenderError;
pub use geometry::{FPoint, Point, Rect};
pub use render::{ClipRegion, SurfaceRenderer};
#[cfg(feature = "sdl")]
pub use surface::SdlSurface;
pub use surface::{MemorySurface, PixelFormat, PixelSurface};
