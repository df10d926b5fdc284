//! Rasterizes one page of draw ops into an RGB bitmap. The export pipeline
//! allocates a single surface and reuses it for every page, so pages are
//! always produced strictly in order.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::render::geometry::{Anchor, DrawOp, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([20, 20, 20]);
const LINE_GRAY: Rgb<u8> = Rgb([110, 110, 110]);

const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;

/// A reusable A4 canvas at a fixed oversampling resolution. Print-sharp
/// output wants something around 300 DPI.
pub struct RasterSurface {
    dpi: u32,
    image: RgbImage,
}

impl RasterSurface {
    pub fn new(dpi: u32) -> Self {
        let width = mm_to_px(PAGE_WIDTH_MM, dpi);
        let height = mm_to_px(PAGE_HEIGHT_MM, dpi);
        Self {
            dpi,
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    /// Draw `ops` onto a cleared canvas and return it. The returned
    /// reference is only valid until the next render call; callers that
    /// keep pages around clone the buffer.
    pub fn render(&mut self, ops: &[DrawOp], font: &FontVec) -> &RgbImage {
        for px in self.image.pixels_mut() {
            *px = WHITE;
        }
        for op in ops {
            match op {
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width_mm,
                } => self.draw_line(*x1, *y1, *x2, *y2, *width_mm),
                DrawOp::Text {
                    text,
                    size_pt,
                    x,
                    y,
                    anchor,
                } => self.draw_text(text, *size_pt, *x, *y, *anchor, font),
            }
        }
        &self.image
    }

    /// Axis-aligned lines only; drawn as filled rectangles so the stroke
    /// width survives oversampling.
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width_mm: f32) {
        let stroke = mm_to_px(width_mm, self.dpi).max(1);
        let (x_px, y_px) = (mm_to_px(x1.min(x2), self.dpi), mm_to_px(y1.min(y2), self.dpi));
        let w = mm_to_px((x2 - x1).abs(), self.dpi).max(stroke);
        let h = mm_to_px((y2 - y1).abs(), self.dpi).max(stroke);
        let rect = Rect::at(x_px as i32, y_px as i32).of_size(w, h);
        draw_filled_rect_mut(&mut self.image, rect, LINE_GRAY);
    }

    fn draw_text(&mut self, text: &str, size_pt: f32, x: f32, y: f32, anchor: Anchor, font: &FontVec) {
        if text.is_empty() {
            return;
        }
        let scale = PxScale::from(size_pt / PT_PER_INCH * self.dpi as f32);
        let (text_w, _) = text_size(scale, font, text);
        let x_px = mm_to_px(x, self.dpi) as i32;
        let x_px = match anchor {
            Anchor::Left => x_px,
            Anchor::Center => x_px - text_w as i32 / 2,
            Anchor::Right => x_px - text_w as i32,
        };
        let y_px = mm_to_px(y, self.dpi) as i32;
        draw_text_mut(&mut self.image, BLACK, x_px, y_px, scale, font, text);
    }
}

fn mm_to_px(mm: f32, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * dpi as f32).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_dimensions_match_a4() {
        let surface = RasterSurface::new(300);
        // 210mm at 300 DPI ~= 2480px, 297mm ~= 3508px
        assert_eq!(surface.image.width(), 2480);
        assert_eq!(surface.image.height(), 3508);
    }

    #[test]
    fn test_mm_to_px_rounding() {
        assert_eq!(mm_to_px(25.4, 300), 300);
        assert_eq!(mm_to_px(0.25, 300), 3);
    }
}
