//! Pixel-level drawing on an `RgbImage`.
//!
//! Coordinates are signed so shapes may extend past the image edge; every
//! primitive clips to the image bounds.

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use image::{Rgb, RgbImage};

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const TEXT: Rgb<u8> = Rgb([40, 40, 40]);
    pub const GRID: Rgb<u8> = Rgb([226, 226, 226]);
    pub const AXIS: Rgb<u8> = Rgb([120, 120, 120]);
    pub const BACKGROUND: Rgb<u8> = Rgb([246, 246, 246]);
    pub const LONG: Rgb<u8> = Rgb([31, 119, 180]);
    pub const SHORT: Rgb<u8> = Rgb([255, 127, 14]);
}

/// Axis-aligned rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    /// Shrink by per-side margins.
    pub fn inset(&self, left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            w: (self.w - left - right).max(1),
            h: (self.h - top - bottom).max(1),
        }
    }
}

/// Maps a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    lo: f64,
    hi: f64,
    px_lo: f64,
    px_hi: f64,
}

impl LinearScale {
    /// `px_lo` is where `lo` lands; pass a larger `px_lo` for y axes.
    pub fn new(lo: f64, hi: f64, px_lo: i64, px_hi: i64) -> Self {
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, lo + 1.0) };
        Self {
            lo,
            hi,
            px_lo: px_lo as f64,
            px_hi: px_hi as f64,
        }
    }

    pub fn map(&self, v: f64) -> i64 {
        let t = (v - self.lo) / (self.hi - self.lo);
        (self.px_lo + t * (self.px_hi - self.px_lo)).round() as i64
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }
}

/// `[min, max]` widened by `pad` of the span on each side, never degenerate.
pub fn padded_bounds(min: f64, max: f64, pad: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        let half = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - half, max + half);
    }
    (min - span * pad, max + span * pad)
}

pub struct Canvas {
    img: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            img: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> i64 {
        i64::from(self.img.width())
    }

    pub fn height(&self) -> i64 {
        i64::from(self.img.height())
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }

    pub fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.width() && y < self.height() {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Alpha-blend `color` over the existing pixel.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgb<u8>, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let under = *self.img.get_pixel(x as u32, y as u32);
        let mix = |c: u8, u: u8| (a * f64::from(c) + (1.0 - a) * f64::from(u)).round() as u8;
        self.img.put_pixel(
            x as u32,
            y as u32,
            Rgb([
                mix(color.0[0], under.0[0]),
                mix(color.0[1], under.0[1]),
                mix(color.0[2], under.0[2]),
            ]),
        );
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width());
        let y1 = rect.bottom().min(self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.img.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    pub fn outline(&mut self, rect: Rect, color: Rgb<u8>) {
        self.hline(rect.y, rect.x, rect.right() - 1, color);
        self.hline(rect.bottom() - 1, rect.x, rect.right() - 1, color);
        self.vline(rect.x, rect.y, rect.bottom() - 1, color);
        self.vline(rect.right() - 1, rect.y, rect.bottom() - 1, color);
    }

    pub fn hline(&mut self, y: i64, x1: i64, x2: i64, color: Rgb<u8>) {
        let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        for x in start..=end {
            self.put(x, y, color);
        }
    }

    pub fn vline(&mut self, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
        let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
        for y in start..=end {
            self.put(x, y, color);
        }
    }

    pub fn dashed_hline(&mut self, y: i64, x1: i64, x2: i64, color: Rgb<u8>) {
        let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        for x in (start..=end).filter(|x| (x - start) % 8 < 5) {
            self.put(x, y, color);
        }
    }

    pub fn dashed_vline(&mut self, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
        let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
        for y in (start..=end).filter(|y| (y - start) % 8 < 5) {
            self.put(x, y, color);
        }
    }

    /// Bresenham line, `thickness` pixels wide.
    pub fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb<u8>, thickness: i64) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness / 2;
        loop {
            for oy in -half..thickness - half {
                for ox in -half..thickness - half {
                    self.put(x + ox, y + oy, color);
                }
            }
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn polyline(&mut self, points: &[(i64, i64)], color: Rgb<u8>, thickness: i64) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color, thickness);
        }
        if let [only] = points {
            self.line(*only, *only, color, thickness + 1);
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: i64, y: i64, text: &str, color: Rgb<u8>, scale: i64) {
        for (i, ch) in text.chars().enumerate() {
            let origin = x + i as i64 * ADVANCE * scale;
            for (row, bits) in font::glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = origin + col * scale;
                    let py = y + row as i64 * scale;
                    self.fill_rect(Rect::new(px, py, scale, scale), color);
                }
            }
        }
    }

    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, color: Rgb<u8>, scale: i64) {
        let w = font::text_width(text, scale);
        self.text(cx - w / 2, y, text, color, scale);
    }

    pub fn text_right(&mut self, right: i64, y: i64, text: &str, color: Rgb<u8>, scale: i64) {
        let w = font::text_width(text, scale);
        self.text(right - w, y, text, color, scale);
    }

    pub fn text_height(scale: i64) -> i64 {
        GLYPH_HEIGHT * scale
    }
}
