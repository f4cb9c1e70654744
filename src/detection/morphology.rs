//! Binary morphology with one-dimensional rectangular structuring elements.
//!
//! Line elements (`k x 1` and `1 x k`) are applied with running counts over
//! each row or column, so the cost does not grow with `k`. Elements span a
//! fixed fraction of the image and are not bounded by the 511 pixel side
//! limit of `imageproc::morphology::Mask`.
//!
//! Inputs are masks where any non-zero pixel is foreground; outputs are 0/255
//! masks. Pixels outside the image never take part in a window.

use image::{GrayImage, Luma};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A line-shaped structuring element anchored at its centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineElement {
    pub orientation: Orientation,
    pub length: u32,
}

impl LineElement {
    /// Element spanning `1 / divisor` of the image along `orientation`
    pub fn for_span(img: &GrayImage, divisor: u32, orientation: Orientation) -> Self {
        let total = match orientation {
            Orientation::Horizontal => img.width(),
            Orientation::Vertical => img.height(),
        };
        Self {
            orientation,
            length: (total / divisor.max(1)).max(1),
        }
    }

    /// Window `[i - before, i + after]` covered when centred on index `i`
    fn reach(&self) -> (u32, u32) {
        let before = self.length / 2;
        (before, self.length - 1 - before)
    }
}

#[derive(Clone, Copy)]
enum Op {
    Dilate,
    Erode,
}

fn apply(img: &GrayImage, element: LineElement, op: Op) -> GrayImage {
    let (width, height) = img.dimensions();
    let (before, after) = element.reach();
    let (lines, len) = match element.orientation {
        Orientation::Horizontal => (height, width),
        Orientation::Vertical => (width, height),
    };
    let at = |line: u32, i: u32| match element.orientation {
        Orientation::Horizontal => (i, line),
        Orientation::Vertical => (line, i),
    };

    let mut out = GrayImage::new(width, height);
    let mut prefix = vec![0u32; len as usize + 1];

    for line in 0..lines {
        for i in 0..len {
            let (x, y) = at(line, i);
            let on = (img.get_pixel(x, y)[0] != 0) as u32;
            prefix[i as usize + 1] = prefix[i as usize] + on;
        }
        for i in 0..len {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(len - 1);
            let count = prefix[hi as usize + 1] - prefix[lo as usize];
            let on = match op {
                Op::Dilate => count > 0,
                Op::Erode => count == hi - lo + 1,
            };
            let (x, y) = at(line, i);
            out.put_pixel(x, y, Luma([if on { 255 } else { 0 }]));
        }
    }

    out
}

pub fn dilate(img: &GrayImage, element: LineElement) -> GrayImage {
    apply(img, element, Op::Dilate)
}

pub fn erode(img: &GrayImage, element: LineElement) -> GrayImage {
    apply(img, element, Op::Erode)
}

/// Dilate then erode: bridges gaps shorter than the element
pub fn close(img: &GrayImage, element: LineElement) -> GrayImage {
    erode(&dilate(img, element), element)
}

/// Erode then dilate: removes runs shorter than the element
pub fn open(img: &GrayImage, element: LineElement) -> GrayImage {
    dilate(&erode(img, element), element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_mask(pattern: &str) -> GrayImage {
        let bytes: Vec<u8> = pattern
            .bytes()
            .map(|b| if b == b'#' { 255 } else { 0 })
            .collect();
        GrayImage::from_raw(bytes.len() as u32, 1, bytes).unwrap()
    }

    fn pattern(img: &GrayImage) -> String {
        img.pixels()
            .map(|p| if p[0] != 0 { '#' } else { '.' })
            .collect()
    }

    #[test]
    fn close_bridges_short_gap() {
        let img = row_mask("###..###....");
        let element = LineElement {
            orientation: Orientation::Horizontal,
            length: 3,
        };
        assert_eq!(pattern(&close(&img, element)), "########....");
    }

    #[test]
    fn open_removes_short_runs() {
        let img = row_mask("#.##.######.");
        let element = LineElement {
            orientation: Orientation::Horizontal,
            length: 3,
        };
        assert_eq!(pattern(&open(&img, element)), ".....######.");
    }

    #[test]
    fn vertical_element_ignores_horizontal_runs() {
        let mut img = GrayImage::new(10, 10);
        for x in 0..10 {
            img.put_pixel(x, 5, Luma([255]));
        }
        for y in 0..10 {
            img.put_pixel(2, y, Luma([255]));
        }
        let element = LineElement {
            orientation: Orientation::Vertical,
            length: 5,
        };
        let opened = open(&img, element);
        assert!((0..10).all(|y| opened.get_pixel(2, y)[0] == 255));
        assert_eq!(opened.get_pixel(7, 5)[0], 0);
    }

    #[test]
    fn element_length_follows_span() {
        let img = GrayImage::new(500, 200);
        let h = LineElement::for_span(&img, 50, Orientation::Horizontal);
        let v = LineElement::for_span(&img, 50, Orientation::Vertical);
        assert_eq!(h.length, 10);
        assert_eq!(v.length, 4);
    }
}
