//! Deterministic synthetic puzzle sheets.
//!
//! Digits are drawn as connected seven-segment glyphs (with a single bar for
//! `1`) so that 6, 8 and 9 carry real holes. Used by the integration tests and
//! the `create_test_puzzle` demo.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::models::GRID_SIZE;

const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// Geometry of a rendered sheet, in pixels
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    /// White border around the grid
    pub margin: u32,
    /// Distance between consecutive grid lines
    pub cell: u32,
    pub line_width: u32,
    pub glyph_width: u32,
    pub glyph_height: u32,
    pub stroke: u32,
    /// Glyph top-left relative to its cell's top-left grid line
    pub glyph_offset: (u32, u32),
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            margin: 40,
            cell: 56,
            line_width: 3,
            glyph_width: 22,
            glyph_height: 30,
            stroke: 4,
            glyph_offset: (12, 12),
        }
    }
}

impl SheetLayout {
    pub fn grid_span(&self) -> u32 {
        self.cell * GRID_SIZE as u32 + self.line_width
    }

    pub fn canvas_size(&self) -> u32 {
        self.grid_span() + 2 * self.margin
    }

    /// Top-left pixel of the glyph drawn in `(row, col)`
    pub fn glyph_origin(&self, row: usize, col: usize) -> (u32, u32) {
        (
            self.margin + col as u32 * self.cell + self.glyph_offset.0,
            self.margin + row as u32 * self.cell + self.glyph_offset.1,
        )
    }
}

#[derive(Clone, Copy)]
enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    /// Centre-left bar used for `1`
    Bar,
}

fn segments(digit: u8) -> &'static [Segment] {
    use Segment::*;
    match digit {
        1 => &[Bar],
        2 => &[A, B, G, E, D],
        3 => &[A, B, G, C, D],
        4 => &[F, G, B, C],
        5 => &[A, F, G, C, D],
        6 => &[A, F, G, E, C, D],
        7 => &[A, B, C],
        8 => &[A, B, C, D, E, F, G],
        9 => &[A, B, C, D, F, G],
        _ => &[],
    }
}

fn segment_rect(segment: Segment, layout: &SheetLayout) -> Rect {
    let (w, h, s) = (layout.glyph_width, layout.glyph_height, layout.stroke);
    let mid = (h - s) / 2;
    let (x, y, rw, rh) = match segment {
        Segment::A => (0, 0, w, s),
        Segment::B => (w - s, 0, s, mid + s),
        Segment::C => (w - s, mid, s, h - mid),
        Segment::D => (0, h - s, w, s),
        Segment::E => (0, mid, s, h - mid),
        Segment::F => (0, 0, s, mid + s),
        Segment::G => (0, mid, w, s),
        Segment::Bar => (s, 0, s, h),
    };
    Rect::at(x as i32, y as i32).of_size(rw, rh)
}

/// Draw `digit` with its glyph box starting at `(x, y)`
pub fn draw_digit(img: &mut RgbImage, digit: u8, x: u32, y: u32, layout: &SheetLayout) {
    for &segment in segments(digit) {
        let r = segment_rect(segment, layout);
        let placed = Rect::at(r.left() + x as i32, r.top() + y as i32).of_size(r.width(), r.height());
        draw_filled_rect_mut(img, placed, INK);
    }
}

/// White sheet with a 9x9 grid and `(row, col, digit)` placements
pub fn render_sheet(layout: &SheetLayout, placements: &[(usize, usize, u8)]) -> RgbImage {
    let size = layout.canvas_size();
    let mut img = RgbImage::from_pixel(size, size, PAPER);
    let span = layout.grid_span();

    for i in 0..=GRID_SIZE as u32 {
        let offset = (layout.margin + i * layout.cell) as i32;
        let start = layout.margin as i32;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(offset, start).of_size(layout.line_width, span),
            INK,
        );
        draw_filled_rect_mut(
            &mut img,
            Rect::at(start, offset).of_size(span, layout.line_width),
            INK,
        );
    }

    for &(row, col, digit) in placements {
        let (x, y) = layout.glyph_origin(row, col);
        draw_digit(&mut img, digit, x, y, layout);
    }

    img
}

/// Sheet with digit `d` in column `d - 1` of the first row, the layout a
/// reference set is generated from
pub fn render_reference_sheet(layout: &SheetLayout) -> RgbImage {
    let placements: Vec<(usize, usize, u8)> =
        (1..=GRID_SIZE as u8).map(|d| (0, d as usize - 1, d)).collect();
    render_sheet(layout, &placements)
}

/// A lone glyph on white with `padding` pixels around it
pub fn render_glyph(digit: u8, layout: &SheetLayout, padding: u32) -> GrayImage {
    let mut img = RgbImage::from_pixel(
        layout.glyph_width + 2 * padding,
        layout.glyph_height + 2 * padding,
        PAPER,
    );
    draw_digit(&mut img, digit, padding, padding, layout);
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y)[0]])
    })
}
