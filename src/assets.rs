//! Decorative app icon. Lives apart from the analysis pipeline and is never
//! called by it.

use image::{DynamicImage, ImageFormat, ImageResult, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub const DEFAULT_ICON_SIZE: u32 = 512;

/// Coordinates below are laid out on this grid and scaled to the output
const REFERENCE_SIZE: f32 = 512.0;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
const WHITE_STRAND: Rgb<u8> = Rgb([255, 255, 255]);
const GRAY_STRAND: Rgb<u8> = Rgb([204, 204, 204]);
const TREND: Rgb<u8> = Rgb([79, 209, 197]);

type Point = (f32, f32);

/// Two hair-like arches and a rising trend line on a dark square
pub fn render_icon(size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, BACKGROUND);
    let scale = size as f32 / REFERENCE_SIZE;

    let arches: [(&[Point; 3], &[Point; 3], Rgb<u8>); 2] = [
        (
            &[(150.0, 350.0), (150.0, 150.0), (200.0, 150.0)],
            &[(200.0, 150.0), (250.0, 150.0), (250.0, 350.0)],
            WHITE_STRAND,
        ),
        (
            &[(260.0, 350.0), (260.0, 180.0), (310.0, 180.0)],
            &[(310.0, 180.0), (360.0, 180.0), (360.0, 350.0)],
            GRAY_STRAND,
        ),
    ];

    for (first, second, color) in arches {
        for curve in [first, second] {
            let points = quadratic_bezier(curve[0], curve[1], curve[2], 30);
            draw_thick_polyline(&mut img, &scaled(&points, scale), 15.0 * scale, color);
        }
    }

    let trend = [
        (120.0, 400.0),
        (180.0, 320.0),
        (250.0, 360.0),
        (320.0, 280.0),
        (400.0, 220.0),
    ];
    let trend = scaled(&trend, scale);
    draw_thick_polyline(&mut img, &trend, 12.0 * scale, TREND);
    for &(x, y) in &trend {
        let radius = (10.0 * scale).round().max(1.0) as i32;
        draw_filled_circle_mut(&mut img, (x.round() as i32, y.round() as i32), radius, TREND);
    }

    img
}

/// `n + 1` samples of the quadratic curve p0 -> p2 pulled towards p1
pub fn quadratic_bezier(p0: Point, p1: Point, p2: Point, n: usize) -> Vec<Point> {
    (0..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let u = 1.0 - t;
            (
                u * u * p0.0 + 2.0 * u * t * p1.0 + t * t * p2.0,
                u * u * p0.1 + 2.0 * u * t * p1.1 + t * t * p2.1,
            )
        })
        .collect()
}

fn scaled(points: &[Point], scale: f32) -> Vec<Point> {
    points.iter().map(|&(x, y)| (x * scale, y * scale)).collect()
}

/// imageproc lines are 1 px wide, so stamp discs along each segment
fn draw_thick_polyline(img: &mut RgbImage, points: &[Point], thickness: f32, color: Rgb<u8>) {
    let radius = (thickness / 2.0).round() as i32;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if radius < 1 {
            draw_line_segment_mut(img, a, b, color);
            continue;
        }
        let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        let steps = length.ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), radius, color);
        }
    }
}

pub fn encode_png(img: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img.clone()).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Lazily rendered icon, shared by everyone who asks.
///
/// Rendering is deterministic, so two callers racing on an empty cache just
/// produce identical images and the last one stored wins.
pub struct IconCache {
    size: u32,
    icon: Mutex<Option<Arc<RgbImage>>>,
}

impl IconCache {
    pub const fn new(size: u32) -> Self {
        Self {
            size,
            icon: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Arc<RgbImage> {
        if let Some(icon) = self.lock().as_ref() {
            return icon.clone();
        }

        // Render without holding the lock
        let rendered = Arc::new(render_icon(self.size));
        let mut guard = self.lock();
        guard.get_or_insert(rendered).clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<RgbImage>>> {
        // A panic elsewhere cannot leave a half-written Option behind
        self.icon.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

static DEFAULT_ICON: IconCache = IconCache::new(DEFAULT_ICON_SIZE);

/// Process-wide default-size icon
pub fn cached_icon() -> Arc<RgbImage> {
    DEFAULT_ICON.get()
}
