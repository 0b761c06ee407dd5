//! North arrow rendering.
//!
//! A two-tone compass arrow: the north half is filled dark, the south half
//! is white with an outline, and an "N" sits above the tip. Purely
//! presentational — no dynamic state.

use super::canvas::{Canvas, PixelRect};
use super::color::Color;
use super::text::TextRenderer;

const ARROW_FILL: Color = Color::rgb(40, 40, 40);

/// Draw a north arrow centered in `rect`, scaled to the smaller box axis.
pub fn draw_north_arrow(canvas: &mut Canvas, rect: PixelRect, text: &TextRenderer) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let size = (rect.width.min(rect.height) as f32) * 0.8;
    if size < 8.0 {
        return;
    }
    let cx = rect.x as f32 + rect.width as f32 / 2.0;
    let cy = rect.y as f32 + rect.height as f32 / 2.0;

    let font_size = (size * 0.28).clamp(9.0, 22.0);
    let label_h = text.line_height(font_size);

    // Diamond with an elongated vertical axis; the label takes the space
    // above the tip.
    let half_h = (size - label_h) / 2.0;
    let half_w = size * 0.18;
    let tip = (cx, cy - half_h + label_h / 2.0);
    let tail = (cx, cy + half_h + label_h / 2.0);
    let left = (cx - half_w, cy + label_h / 2.0);
    let right = (cx + half_w, cy + label_h / 2.0);

    // north half filled dark
    canvas.fill_triangle(tip, left, right, ARROW_FILL);
    // south half white with outline
    canvas.fill_triangle(tail, left, right, Color::WHITE);
    let edge = |canvas: &mut Canvas, a: (f32, f32), b: (f32, f32)| {
        canvas.line(a.0 as i32, a.1 as i32, b.0 as i32, b.1 as i32, ARROW_FILL);
    };
    edge(canvas, tip, left);
    edge(canvas, tip, right);
    edge(canvas, tail, left);
    edge(canvas, tail, right);
    edge(canvas, left, right);

    // "N" above the tip
    let label_w = text.measure("N", font_size, true);
    text.draw(
        canvas,
        "N",
        cx - label_w / 2.0,
        tip.1 - label_h - 1.0,
        font_size,
        Color::BLACK,
        true,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_marks_both_halves() {
        let text = TextRenderer::estimated();
        let mut canvas = Canvas::new(120, 120, Color::rgb(200, 220, 240));
        draw_north_arrow(&mut canvas, PixelRect::new(0, 0, 120, 120), &text);
        let img = canvas.image();
        let dark = img.pixels().filter(|p| p.0[0] < 64).count();
        let white = img.pixels().filter(|p| p.0 == [255, 255, 255, 255]).count();
        assert!(dark > 30, "filled north half missing ({dark} dark px)");
        assert!(white > 30, "white south half missing ({white} white px)");
    }

    #[test]
    fn tiny_box_is_skipped() {
        let text = TextRenderer::estimated();
        let mut canvas = Canvas::new(8, 8, Color::WHITE);
        draw_north_arrow(&mut canvas, PixelRect::new(0, 0, 4, 4), &text);
        assert!(canvas.image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
