use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Bilinear resize to a `size` x `size` square, ignoring aspect ratio
pub fn resize_square(img: &RgbImage, size: u32) -> RgbImage {
    image::imageops::resize(img, size, size, FilterType::Triangle)
}

pub fn invert(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    image::imageops::invert(&mut out);
    out
}

/// Surround `img` with a `border` pixel wide band of `fill`
pub fn pad(img: &GrayImage, border: u32, fill: Luma<u8>) -> GrayImage {
    let mut out = GrayImage::from_pixel(img.width() + 2 * border, img.height() + 2 * border, fill);
    image::imageops::replace(&mut out, img, border as i64, border as i64);
    out
}

/// Otsu binarisation with dark pixels becoming foreground (255)
pub fn binarize_dark_foreground(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    tracing::trace!(level, "otsu level");
    threshold(img, level, ThresholdType::BinaryInverted)
}

/// Gaussian-weighted adaptive threshold.
///
/// A pixel becomes 255 when it is brighter than its local Gaussian mean minus
/// `offset`. The kernel sigma is derived from `block_size` the same way a
/// `block_size` x `block_size` Gaussian kernel with automatic sigma would be.
pub fn adaptive_threshold_gaussian(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let block = block_size.max(3) as f32;
    let sigma = 0.3 * ((block - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(img, sigma);

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let value = img.get_pixel(x, y)[0] as f32;
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        if value > mean - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Pixel-wise saturating sum of two masks of equal size
pub fn saturating_sum(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].saturating_add(b.get_pixel(x, y)[0])])
    })
}
