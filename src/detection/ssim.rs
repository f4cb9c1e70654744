//! Mean structural similarity between two equally sized grayscale images.
//!
//! Statistics are gathered over every 7x7 window lying fully inside the image
//! with uniform weights and sample covariance, using a data range of 255,
//! `K1 = 0.01` and `K2 = 0.03`. Images with a side shorter than the window are
//! compared through a single window covering the whole image.

use image::GrayImage;

const WINDOW: u32 = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area table with one row and column of zero padding
struct Integral {
    width: usize,
    sums: Vec<f64>,
}

impl Integral {
    fn new(width: u32, height: u32, value: impl Fn(u32, u32) -> f64) -> Self {
        let w = width as usize + 1;
        let mut sums = vec![0.0; w * (height as usize + 1)];
        for y in 0..height {
            let mut row = 0.0;
            for x in 0..width {
                row += value(x, y);
                let i = (y as usize + 1) * w + x as usize + 1;
                sums[i] = sums[i - w] + row;
            }
        }
        Self { width: w, sums }
    }

    /// Sum over `[x, x + w) x [y, y + h)`
    fn sum(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        self.sums[y1 * self.width + x1] - self.sums[y0 * self.width + x1]
            - self.sums[y1 * self.width + x0]
            + self.sums[y0 * self.width + x0]
    }
}

/// Mean SSIM of `a` against `b`; 1.0 for identical images.
///
/// Panics if the images differ in size; callers resize first.
pub fn structural_similarity(a: &GrayImage, b: &GrayImage) -> f64 {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "structural_similarity needs equally sized images"
    );
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let (win_w, win_h) = if width < WINDOW || height < WINDOW {
        (width, height)
    } else {
        (WINDOW, WINDOW)
    };

    let pa = |x: u32, y: u32| a.get_pixel(x, y)[0] as f64;
    let pb = |x: u32, y: u32| b.get_pixel(x, y)[0] as f64;
    let sa = Integral::new(width, height, pa);
    let sb = Integral::new(width, height, pb);
    let saa = Integral::new(width, height, |x, y| pa(x, y) * pa(x, y));
    let sbb = Integral::new(width, height, |x, y| pb(x, y) * pb(x, y));
    let sab = Integral::new(width, height, |x, y| pa(x, y) * pb(x, y));

    let n = (win_w * win_h) as f64;
    let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut count = 0u64;
    for y in 0..=(height - win_h) {
        for x in 0..=(width - win_w) {
            let ux = sa.sum(x, y, win_w, win_h) / n;
            let uy = sb.sum(x, y, win_w, win_h) / n;
            let uxx = saa.sum(x, y, win_w, win_h) / n;
            let uyy = sbb.sum(x, y, win_w, win_h) / n;
            let uxy = sab.sum(x, y, win_w, win_h) / n;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            count += 1;
        }
    }

    total / count as f64
}
