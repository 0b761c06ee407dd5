//! The output surface and its drawing primitives.
//!
//! `Canvas` wraps an RGBA buffer and exposes the handful of operations the
//! element renderers need: rectangle fills and strokes, lines, triangles,
//! and raster blits. All primitives clip to the surface bounds and blend
//! with source-over alpha, so callers never worry about out-of-range
//! coordinates or partially transparent paint.

use image::{imageops, Rgba, RgbaImage};

use super::color::Color;

/// An element's absolute position on the page, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Shrink by `amount` on every side, clamping at zero size.
    pub fn inset(&self, amount: i32) -> Self {
        let w = (self.width as i32 - 2 * amount).max(0) as u32;
        let h = (self.height as i32 - 2 * amount).max(0) as u32;
        Self::new(self.x + amount, self.y + amount, w, h)
    }
}

/// An RGBA drawing surface.
pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    /// Create a surface filled with a background color.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let img = RgbaImage::from_pixel(width.max(1), height.max(1), background.to_rgba_pixel());
        Self { img }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Blend a single pixel with source-over alpha. Out-of-bounds is a no-op.
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if color.a == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.img.width() || y >= self.img.height() {
            return;
        }
        let dst = self.img.get_pixel_mut(x, y);
        *dst = blend_over(*dst, color, 1.0);
    }

    /// Blend a pixel with an extra coverage factor (used by glyph rasterization).
    pub fn put_coverage(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if coverage <= 0.0 || color.a == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.img.width() || y >= self.img.height() {
            return;
        }
        let dst = self.img.get_pixel_mut(x, y);
        *dst = blend_over(*dst, color, coverage.min(1.0));
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        if color.a == 0 {
            return;
        }
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put(x, y, color);
            }
        }
    }

    /// Stroke a rectangle outline of the given thickness, drawn inward.
    pub fn stroke_rect(&mut self, rect: PixelRect, color: Color, thickness: u32) {
        let t = thickness as i32;
        // top and bottom bands
        self.fill_rect(PixelRect::new(rect.x, rect.y, rect.width, thickness), color);
        self.fill_rect(
            PixelRect::new(rect.x, rect.bottom() - t, rect.width, thickness),
            color,
        );
        // left and right bands
        self.fill_rect(PixelRect::new(rect.x, rect.y, thickness, rect.height), color);
        self.fill_rect(
            PixelRect::new(rect.right() - t, rect.y, thickness, rect.height),
            color,
        );
    }

    /// Draw a straight line (Bresenham).
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
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

    /// Fill a triangle by horizontal scanline between edge intersections.
    pub fn fill_triangle(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        c: (f32, f32),
        color: Color,
    ) {
        let min_y = a.1.min(b.1).min(c.1).floor() as i32;
        let max_y = a.1.max(b.1).max(c.1).ceil() as i32;
        for y in min_y..=max_y {
            let yc = y as f32 + 0.5;
            let mut xs: Vec<f32> = Vec::with_capacity(3);
            for (p, q) in [(a, b), (b, c), (c, a)] {
                if (p.1 <= yc && q.1 > yc) || (q.1 <= yc && p.1 > yc) {
                    let t = (yc - p.1) / (q.1 - p.1);
                    xs.push(p.0 + t * (q.0 - p.0));
                }
            }
            if xs.len() >= 2 {
                let lo = xs.iter().cloned().fold(f32::INFINITY, f32::min);
                let hi = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                for x in lo.floor() as i32..=hi.ceil() as i32 {
                    if (x as f32 + 0.5) >= lo && (x as f32 + 0.5) <= hi {
                        self.put(x, y, color);
                    }
                }
            }
        }
    }

    /// Copy a raster onto the surface at (x, y), blending per pixel.
    pub fn blit(&mut self, src: &RgbaImage, x: i32, y: i32) {
        for (sx, sy, px) in src.enumerate_pixels() {
            let color = Color::rgba(px[0], px[1], px[2], px[3]);
            self.put(x + sx as i32, y + sy as i32, color);
        }
    }

    /// Resize a raster to exactly fill `rect` and blit it.
    ///
    /// The caller decides the aspect policy; this does an exact resize.
    pub fn blit_scaled(&mut self, src: &RgbaImage, rect: PixelRect) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        if src.width() == rect.width && src.height() == rect.height {
            self.blit(src, rect.x, rect.y);
            return;
        }
        let resized = imageops::resize(src, rect.width, rect.height, imageops::FilterType::Lanczos3);
        self.blit(&resized, rect.x, rect.y);
    }

    /// Aspect-fit a raster within `rect`: scale to the limiting axis and
    /// center on the other (letterbox).
    pub fn blit_fitted(&mut self, src: &RgbaImage, rect: PixelRect) {
        if rect.width == 0 || rect.height == 0 || src.width() == 0 || src.height() == 0 {
            return;
        }
        let sx = rect.width as f64 / src.width() as f64;
        let sy = rect.height as f64 / src.height() as f64;
        let s = sx.min(sy);
        let w = ((src.width() as f64 * s).round() as u32).max(1);
        let h = ((src.height() as f64 * s).round() as u32).max(1);
        let x = rect.x + ((rect.width - w) / 2) as i32;
        let y = rect.y + ((rect.height - h) / 2) as i32;
        self.blit_scaled(src, PixelRect::new(x, y, w, h));
    }
}

/// Source-over blend of `src` (scaled by `coverage`) onto `dst`.
fn blend_over(dst: Rgba<u8>, src: Color, coverage: f32) -> Rgba<u8> {
    let sa = (src.a as f32 / 255.0) * coverage;
    if sa >= 1.0 {
        return Rgba([src.r, src.g, src.b, 255]);
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let ch = |s: u8, d: u8| -> u8 {
        let sv = s as f32 / 255.0;
        let dv = d as f32 / 255.0;
        (((sv * sa + dv * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };
    Rgba([
        ch(src.r, dst[0]),
        ch(src.g, dst[1]),
        ch(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> [u8; 4] {
        canvas.image().get_pixel(x, y).0
    }

    #[test]
    fn new_canvas_is_background_filled() {
        let c = Canvas::new(4, 3, Color::rgb(10, 20, 30));
        assert_eq!(pixel(&c, 0, 0), [10, 20, 30, 255]);
        assert_eq!(pixel(&c, 3, 2), [10, 20, 30, 255]);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut c = Canvas::new(10, 10, Color::WHITE);
        c.fill_rect(PixelRect::new(-5, -5, 8, 8), Color::BLACK);
        assert_eq!(pixel(&c, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 2, 2), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 3, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn stroke_rect_leaves_interior() {
        let mut c = Canvas::new(10, 10, Color::WHITE);
        c.stroke_rect(PixelRect::new(1, 1, 8, 8), Color::BLACK, 1);
        assert_eq!(pixel(&c, 1, 1), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 8, 8), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 4, 4), [255, 255, 255, 255]);
    }

    #[test]
    fn transparent_paint_is_noop() {
        let mut c = Canvas::new(4, 4, Color::WHITE);
        c.fill_rect(PixelRect::new(0, 0, 4, 4), Color::TRANSPARENT);
        assert_eq!(pixel(&c, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn semi_transparent_blends() {
        let mut c = Canvas::new(1, 1, Color::WHITE);
        c.put(0, 0, Color::rgba(0, 0, 0, 128));
        let [r, g, b, _] = pixel(&c, 0, 0);
        // roughly half-way gray
        assert!(r > 120 && r < 135, "got {r}");
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn blit_fitted_letterboxes_wide_image() {
        // 100x50 source into 60x60 box → scaled to 60x30, centered vertically
        let src = RgbaImage::from_pixel(100, 50, Rgba([255, 0, 0, 255]));
        let mut c = Canvas::new(60, 60, Color::WHITE);
        c.blit_fitted(&src, PixelRect::new(0, 0, 60, 60));
        assert_eq!(pixel(&c, 30, 30), [255, 0, 0, 255]);
        // letterbox bands stay background
        assert_eq!(pixel(&c, 30, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&c, 30, 55), [255, 255, 255, 255]);
    }

    #[test]
    fn triangle_fills_centroid() {
        let mut c = Canvas::new(20, 20, Color::WHITE);
        c.fill_triangle((2.0, 18.0), (18.0, 18.0), (10.0, 2.0), Color::BLACK);
        assert_eq!(pixel(&c, 10, 12), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 1, 1), [255, 255, 255, 255]);
    }
}
