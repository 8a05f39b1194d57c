use image::GrayImage;

use crate::config::{AdaptiveMethod, BorderMode};
use crate::models::BinaryMask;

/// Bright iff intensity >= cutoff
pub fn fixed_threshold(gray: &GrayImage, cutoff: u8) -> BinaryMask {
    BinaryMask::from_fn(gray.width(), gray.height(), |x, y| gray.get_pixel(x, y)[0] >= cutoff)
}

/// Bright iff intensity > (local average over a `block_size` window) - `constant`.
///
/// The local average is rounded to the nearest intensity level before the
/// comparison and the constant is rounded up, so the result only depends on
/// integer differences between a pixel and its surroundings. A uniform
/// brightness shift (that does not clip) leaves the mask unchanged.
pub fn adaptive_threshold(
    gray: &GrayImage,
    block_size: u32,
    constant: f32,
    method: AdaptiveMethod,
    border: BorderMode,
) -> BinaryMask {
    let kernel = match method {
        AdaptiveMethod::Mean => box_kernel(block_size),
        AdaptiveMethod::Gaussian => gaussian_kernel(block_size),
    };
    let local = separable_filter(gray, &kernel, border);
    let offset = constant.ceil() as i32;
    let width = gray.width() as usize;

    BinaryMask::from_fn(gray.width(), gray.height(), |x, y| {
        let mean = local[y as usize * width + x as usize].round() as i32;
        gray.get_pixel(x, y)[0] as i32 - mean > -offset
    })
}

fn box_kernel(size: u32) -> Vec<f32> {
    vec![1.0 / size as f32; size as usize]
}

/// Normalised 1-D Gaussian of odd length `size`, with the sigma rule
/// commonly used for block thresholds: 0.3 * ((size - 1) / 2 - 1) + 0.8
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i64;
    let weights: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / total) as f32).collect()
}

/// Map a possibly out-of-range coordinate back into `0..len`
pub fn border_index(i: i64, len: u32, border: BorderMode) -> u32 {
    let n = len as i64;
    if n == 1 {
        return 0;
    }
    match border {
        BorderMode::Replicate => i.clamp(0, n - 1) as u32,
        BorderMode::Reflect => {
            let period = 2 * (n - 1);
            let mut j = i.rem_euclid(period);
            if j >= n {
                j = period - j;
            }
            j as u32
        }
    }
}

/// Horizontal then vertical pass of a symmetric 1-D kernel; row-major result
fn separable_filter(gray: &GrayImage, kernel: &[f32], border: BorderMode) -> Vec<f32> {
    let (w, h) = gray.dimensions();
    let half = (kernel.len() / 2) as i64;
    let mut horizontal = vec![0.0f32; (w * h) as usize];

    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = border_index(x as i64 + k as i64 - half, w, border);
                acc += gray.get_pixel(sx, y)[0] as f32 * weight;
            }
            horizontal[(y * w + x) as usize] = acc;
        }
    }

    let mut out = vec![0.0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = border_index(y as i64 + k as i64 - half, h, border);
                acc += horizontal[(sy * w + x) as usize] * weight;
            }
            out[(y * w + x) as usize] = acc;
        }
    }

    out
}
