use std::f32::consts::{PI, TAU};
use std::time::Instant;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use softraster::{
    BlendMode, Color, FPoint, MemorySurface, PixelFormat, PixelSurface, Point, Rect,
    RenderError, RenderSettings, SdlSurface, SurfaceRenderer,
};

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;
const SETTINGS_FILE: &str = "render.json";

struct Options {
    width: u32,
    height: u32,
    settings: Option<String>,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        settings: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        opts.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        opts.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // WxH, e.g. 1280x720
                    if let Some((w, h)) = args[i + 1].split_once('x') {
                        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                            opts.width = w;
                            opts.height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--settings" => {
                if i + 1 < args.len() {
                    opts.settings = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: raster-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W           Set window width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H          Set window height (default: {})", DEFAULT_HEIGHT);
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1280x720)");
                println!("  --settings PATH           Load initial render settings from JSON");
                println!("  --help                    Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    opts
}

/// Small sprite composited with `blend_surface` every frame
fn make_sprite() -> Result<SurfaceRenderer<MemorySurface>, RenderError> {
    let mut sprite = SurfaceRenderer::with_new_surface(48, 48, PixelFormat::RGBA8888)?;
    sprite.set_draw_color(Color::TRANSPARENT);
    sprite.clear()?;
    sprite.set_draw_color(Color::rgba(255, 220, 0, 200));
    sprite.fill_circle(Point::new(24, 24), 20)?;
    sprite.set_draw_color(Color::rgba(40, 40, 40, 255));
    sprite.fill_ellipse(Point::new(16, 18), 3, 5)?;
    sprite.fill_ellipse(Point::new(32, 18), 3, 5)?;
    sprite.draw_ellipse_arc(Point::new(24, 24), 12, 10, 0.3, PI - 0.3)?;
    Ok(sprite)
}

/// One frame of every primitive; `t` is seconds since start
fn draw_showcase(
    r: &mut SurfaceRenderer<SdlSurface<'_>>,
    sprite: &mut SurfaceRenderer<MemorySurface>,
    settings: &RenderSettings,
    t: f32,
) -> Result<(), RenderError> {
    let (w, h) = r
        .surface()
        .map_or((0, 0), |s| (s.width() as i32, s.height() as i32));
    let (cx, cy) = (w / 2, h / 2);

    r.reset_clip_rect();
    r.set_blend_mode(BlendMode::None);
    r.set_draw_color(Color::BLACK);
    r.clear()?;
    r.fill_rect_gradient(
        Rect::new(0, 0, w, h),
        Color::rgb(10, 10, 40),
        Color::rgb(40, 10, 40),
        Color::rgb(10, 40, 40),
        Color::rgb(0, 0, 0),
    )?;
    r.set_clip_rect(settings.clip_rect);

    // Fan of lines, aliased on the left, antialiased on the right
    for i in 0..16 {
        let a = t * 0.5 + i as f32 * TAU / 16.0;
        let (dx, dy) = (a.cos() * 80.0, a.sin() * 80.0);
        r.set_draw_color(Color::rgb(255, (i * 16) as u8, 64));
        r.draw_line(
            Point::new(120, 120),
            Point::new(120 + dx as i32, 120 + dy as i32),
        )?;
        r.draw_line_aa(
            FPoint::new(w as f32 - 120.0, 120.0),
            FPoint::new(w as f32 - 120.0 + dx, 120.0 + dy),
        )?;
    }

    // Circles and ellipses
    let pulse = ((t * 2.0).sin() * 20.0) as i32;
    r.set_draw_color(Color::rgb(0, 200, 255));
    r.fill_circle(Point::new(cx, cy), 40 + pulse / 2)?;
    r.set_draw_color(settings.draw_color);
    r.draw_circle(Point::new(cx, cy), 60 + pulse)?;
    r.draw_ellipse(Point::new(cx, cy), 120, 50 + pulse)?;
    r.draw_ellipse_arc(Point::new(cx, cy), 140, 90, t % TAU, t % TAU + PI / 2.0)?;

    // Curves
    let wave = (t * 1.3).sin() * 60.0;
    r.set_draw_color(Color::rgb(120, 255, 120));
    r.draw_bezier_quad(
        FPoint::new(40.0, h as f32 - 40.0),
        FPoint::new(160.0, h as f32 - 160.0 + wave),
        FPoint::new(280.0, h as f32 - 40.0),
    )?;
    r.draw_bezier_cubic(
        FPoint::new(40.0, h as f32 - 120.0),
        FPoint::new(120.0, h as f32 - 220.0 - wave),
        FPoint::new(200.0, h as f32 - 20.0 + wave),
        FPoint::new(280.0, h as f32 - 120.0),
    )?;
    let knots: Vec<FPoint> = (0..6)
        .map(|i| {
            let x = w as f32 - 300.0 + i as f32 * 50.0;
            FPoint::new(x, h as f32 - 100.0 + (t + i as f32).sin() * 40.0)
        })
        .collect();
    r.set_draw_color(Color::rgb(255, 120, 255));
    r.draw_catmull_rom(&knots, 0.5)?;
    r.set_draw_color(Color::rgb(255, 255, 120));
    r.draw_bspline(&knots, 3)?;
    r.draw_curve(
        |s| FPoint::new(cx as f32 + s * 40.0, 40.0 + (s * 4.0 + t * 3.0).sin() * 20.0),
        -3.0,
        3.0,
        120,
    )?;

    // Polygons: a spinning star, filled then outlined
    let star: Vec<FPoint> = (0..10)
        .map(|i| {
            let a = -t + i as f32 * PI / 5.0;
            let rad = if i % 2 == 0 { 70.0 } else { 30.0 };
            FPoint::new(cx as f32 + a.cos() * rad, h as f32 - 110.0 + a.sin() * rad)
        })
        .collect();
    r.set_draw_color(Color::rgb(255, 80, 0));
    r.fill_polygon(&star)?;
    r.set_draw_color(Color::WHITE);
    r.draw_polygon_aa(&star)?;

    // Thick lines
    r.set_draw_color(Color::rgb(200, 200, 255));
    r.draw_line_thick(Point::new(40, cy - 30), Point::new(200, cy + 10 + pulse), 6)?;
    r.draw_line_thick_rounded(Point::new(40, cy + 40), Point::new(200, cy + 60 - pulse), 9)?;

    // Translucent squares under the configured blend mode
    r.set_blend_mode(settings.blend_mode);
    let colors = [
        Color::rgba(255, 0, 0, 128),
        Color::rgba(0, 255, 0, 128),
        Color::rgba(0, 0, 255, 128),
    ];
    for (i, &c) in colors.iter().enumerate() {
        r.set_draw_color(c);
        r.fill_rect(Rect::new(w - 200 + i as i32 * 30, cy - 40 + i as i32 * 20, 80, 80))?;
    }
    r.set_blend_mode(BlendMode::None);

    // Bouncing sprite
    let sx = cx + ((t * 0.9).cos() * (cx - 60) as f32) as i32;
    let sy = 40 + ((t * 1.7).sin().abs() * 80.0) as i32;
    r.blend_surface(sprite, None, Point::new(sx - 24, sy), BlendMode::Blend)?;

    r.set_draw_color(Color::WHITE);
    r.draw_rect(Rect::new(0, 0, w, h))
}

fn next_blend_mode(mode: BlendMode) -> BlendMode {
    match mode {
        BlendMode::None => BlendMode::Blend,
        BlendMode::Blend => BlendMode::Add,
        BlendMode::Add => BlendMode::Modulate,
        BlendMode::Modulate => BlendMode::Multiply,
        BlendMode::Multiply => BlendMode::None,
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args();

    let mut settings = match &opts.settings {
        Some(path) => RenderSettings::load(path).map_err(|e| e.to_string())?,
        None => RenderSettings::default(),
    };
    let save_path = opts.settings.clone().unwrap_or_else(|| SETTINGS_FILE.to_string());

    let sdl_context = sdl2::init()?;
    let video = sdl_context.video()?;
    let window = video
        .window("raster-demo", opts.width, opts.height)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;
    let mut event_pump = sdl_context.event_pump()?;
    let mut sprite = make_sprite().map_err(|e| e.to_string())?;

    println!("=== raster-demo ===");
    println!("Resolution: {}x{}", opts.width, opts.height);
    println!("Use --help for command line options.");
    println!("Controls:");
    println!("  B       - Cycle blend mode for the translucent squares");
    println!("  C       - Toggle a centred clip rectangle");
    println!("  Space   - Pause animation");
    println!("  S       - Save render settings to {}", save_path);
    println!("  Escape  - Quit");

    let start = Instant::now();
    let mut paused_at: Option<f32> = None;
    let mut frames = 0u32;
    let mut last_report = Instant::now();

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match key {
                    Keycode::B => {
                        settings.blend_mode = next_blend_mode(settings.blend_mode);
                        log::info!("blend mode: {:?}", settings.blend_mode);
                    },
                    Keycode::C => {
                        settings.clip_rect = match settings.clip_rect {
                            Some(_) => None,
                            None => {
                                let (w, h) = (opts.width as i32, opts.height as i32);
                                Some(Rect::new(w / 4, h / 4, w / 2, h / 2))
                            },
                        };
                    },
                    Keycode::Space => {
                        paused_at = match paused_at {
                            Some(_) => None,
                            None => Some(start.elapsed().as_secs_f32()),
                        };
                    },
                    Keycode::S => match settings.save(&save_path) {
                        Ok(()) => println!("Settings saved to {}", save_path),
                        Err(e) => eprintln!("Failed to save: {}", e),
                    },
                    _ => {},
                },
                _ => {},
            }
        }

        let t = paused_at.unwrap_or_else(|| start.elapsed().as_secs_f32());
        let mut surface = window.surface(&event_pump)?;
        {
            let mut renderer =
                SurfaceRenderer::new(SdlSurface::new(&mut surface)).map_err(|e| e.to_string())?;
            draw_showcase(&mut renderer, &mut sprite, &settings, t).map_err(|e| e.to_string())?;
        }
        surface.update_window()?;

        frames += 1;
        if last_report.elapsed().as_secs() >= 5 {
            log::info!("{:.1} fps", frames as f32 / last_report.elapsed().as_secs_f32());
            frames = 0;
            last_report = Instant::now();
        }
    }

    Ok(())
}
