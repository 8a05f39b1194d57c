use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};

/// Stretch to exactly `width` x `height`. No crop, no letterboxing, so
/// every run works on the same pixel count.
pub fn resize_exact(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Triangle)
}

pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Edge-preserving smoothing.
///
/// Each output pixel is the average of a circular neighbourhood of
/// `diameter` pixels, weighted by spatial distance (`sigma_space`) and by
/// colour similarity to the centre (`sigma_color`, L1 over the channels).
/// Thin bright strands survive because their neighbours across the edge get
/// almost no weight. Borders replicate the edge pixel.
pub fn bilateral_filter(img: &RgbImage, diameter: u32, sigma_color: f32, sigma_space: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let radius = (diameter / 2) as i64;

    // Window offsets and their spatial weights, computed once
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let mut window = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq > (radius * radius) as f32 {
                continue;
            }
            window.push((dx, dy, (dist_sq * space_coeff).exp()));
        }
    }

    // L1 colour distance is at most 3 * 255
    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let color_weight: Vec<f32> = (0..=3 * 255)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let clamp = |v: i64, max: u32| v.clamp(0, max as i64 - 1) as u32;

    RgbImage::from_fn(w, h, |x, y| {
        let center = img.get_pixel(x, y);
        let mut sum = [0.0f32; 3];
        let mut weight_sum = 0.0f32;

        for &(dx, dy, space_weight) in &window {
            let nx = clamp(x as i64 + dx, w);
            let ny = clamp(y as i64 + dy, h);
            let neighbor = img.get_pixel(nx, ny);

            let diff: usize = (0..3)
                .map(|c| (neighbor[c] as i32 - center[c] as i32).unsigned_abs() as usize)
                .sum();
            let weight = space_weight * color_weight[diff];

            for c in 0..3 {
                sum[c] += neighbor[c] as f32 * weight;
            }
            weight_sum += weight;
        }

        if weight_sum > 0.0 {
            Rgb([
                (sum[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (sum[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (sum[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
            ])
        } else {
            *center
        }
    })
}
