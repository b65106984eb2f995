//! Grayscale image operations shared by the cascade and circle detectors.
//!
//! All buffers are owned `ndarray` arrays scoped to the caller, so every
//! intermediate image is released when the analysis of a frame returns.

use ndarray::{Array2, ArrayView2};

use crate::shared::frame::Frame;

/// Luma conversion with ITU-R BT.601 weights.
///
/// Single-channel frames are copied as-is; alpha is ignored for 4-channel
/// frames. Returns `None` for channel counts other than 1, 3 and 4, and for
/// buffers whose length does not match the frame geometry.
pub fn to_grayscale(frame: &Frame) -> Option<Array2<u8>> {
    if !frame.is_well_formed() {
        return None;
    }
    let src = frame.as_ndarray();
    let (h, w) = (frame.height() as usize, frame.width() as usize);
    match frame.channels() {
        1 => Some(src.index_axis(ndarray::Axis(2), 0).to_owned()),
        3 | 4 => Some(Array2::from_shape_fn((h, w), |(y, x)| {
            let r = src[[y, x, 0]] as f32;
            let g = src[[y, x, 1]] as f32;
            let b = src[[y, x, 2]] as f32;
            (0.299 * r + 0.587 * g + 0.114 * b).round().clamp(0.0, 255.0) as u8
        })),
        _ => None,
    }
}

/// Histogram equalization: spreads the cumulative intensity distribution
/// over the full 0-255 range.
pub fn equalize_histogram(gray: ArrayView2<'_, u8>) -> Array2<u8> {
    let total = gray.len();
    if total == 0 {
        return gray.to_owned();
    }

    let mut hist = [0usize; 256];
    for &v in gray.iter() {
        hist[v as usize] += 1;
    }

    let mut cdf = [0usize; 256];
    let mut running = 0;
    for (i, &count) in hist.iter().enumerate() {
        running += count;
        cdf[i] = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        // Flat image: nothing to spread.
        return gray.to_owned();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let lut: Vec<u8> = cdf
        .iter()
        .map(|&c| ((c.saturating_sub(cdf_min)) as f64 * scale).round().clamp(0.0, 255.0) as u8)
        .collect();

    gray.mapv(|v| lut[v as usize])
}

/// 1D Gaussian kernel; sigma follows OpenCV's `sigma = 0` rule
/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = 0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (kernel_size / 2) as f64;
    let mut kernel: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel.iter().map(|&v| v as f32).collect()
}

/// Separable Gaussian blur with edge replication.
pub fn gaussian_blur(gray: ArrayView2<'_, u8>, kernel_size: usize) -> Array2<u8> {
    let (h, w) = gray.dim();
    if kernel_size <= 1 || h == 0 || w == 0 {
        return gray.to_owned();
    }
    let kernel = gaussian_kernel_1d(kernel_size);
    let half = (kernel_size / 2) as isize;

    let horizontal = Array2::from_shape_fn((h, w), |(y, x)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, &wt)| {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                gray[[y, sx]] as f32 * wt
            })
            .sum::<f32>()
    });

    Array2::from_shape_fn((h, w), |(y, x)| {
        let sum: f32 = kernel
            .iter()
            .enumerate()
            .map(|(k, &wt)| {
                let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                horizontal[[sy, x]] * wt
            })
            .sum();
        sum.round().clamp(0.0, 255.0) as u8
    })
}

/// 3x3 Sobel derivatives `(dx, dy)`; border pixels are left at zero.
pub fn sobel(gray: ArrayView2<'_, u8>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = gray.dim();
    let mut dx = Array2::<f32>::zeros((h, w));
    let mut dy = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return (dx, dy);
    }

    let p = |y: usize, x: usize| gray[[y, x]] as f32;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            dx[[y, x]] = (p(y - 1, x + 1) + 2.0 * p(y, x + 1) + p(y + 1, x + 1))
                - (p(y - 1, x - 1) + 2.0 * p(y, x - 1) + p(y + 1, x - 1));
            dy[[y, x]] = (p(y + 1, x - 1) + 2.0 * p(y + 1, x) + p(y + 1, x + 1))
                - (p(y - 1, x - 1) + 2.0 * p(y - 1, x) + p(y - 1, x + 1));
        }
    }
    (dx, dy)
}
