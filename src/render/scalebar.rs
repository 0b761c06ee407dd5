//! Scale bar rendering.
//!
//! The bar length comes from a fixed "nice number" ladder: the largest
//! ladder value no longer than 90% of the space available is chosen, which
//! avoids both an awkwardly short bar and one that just barely overflows
//! its box. The drawn bar is 4 alternating filled segments with end ticks
//! and a unit-aware length label.

use serde::{Deserialize, Serialize};

use super::canvas::{Canvas, PixelRect};
use super::color::Color;
use super::text::TextRenderer;

/// Round ground-length values a scale bar may take, in ground units.
pub const NICE_NUMBER_LADDER: [f64; 14] = [
    10.0, 20.0, 25.0, 50.0, 100.0, 200.0, 250.0, 500.0, 1000.0, 2000.0, 2500.0, 5000.0, 10000.0,
    20000.0,
];

/// Fraction of the theoretical maximum bar length a ladder value may use.
const LADDER_HEADROOM: f64 = 0.9;

/// Fraction of the element box the bar itself may span; the rest is margin
/// for the end ticks and label overhang.
const BAR_SPAN_FRACTION: f64 = 0.8;

/// Ground unit system for the scale bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Feet,
    Meters,
}

impl Units {
    /// Unit-aware label: small values in the base unit, large values in the
    /// derived unit to one decimal place.
    pub fn format_length(&self, ground_length: f64) -> String {
        match self {
            Units::Feet => {
                if ground_length < 5280.0 {
                    format!("{} ft", ground_length.round() as i64)
                } else {
                    format!("{:.1} mi", ground_length / 5280.0)
                }
            }
            Units::Meters => {
                if ground_length < 1000.0 {
                    format!("{} m", ground_length.round() as i64)
                } else {
                    format!("{:.1} km", ground_length / 1000.0)
                }
            }
        }
    }
}

/// Largest ladder value that fits within the headroom of `max_ground_length`.
///
/// Returns `None` when even the smallest rung overflows.
pub fn select_bar_length(max_ground_length: f64) -> Option<f64> {
    let budget = max_ground_length * LADDER_HEADROOM;
    NICE_NUMBER_LADDER
        .iter()
        .copied()
        .filter(|v| *v <= budget)
        .last()
}

/// Draw a scale bar into `rect`.
///
/// `ground_per_px` is ground units per output pixel (resolved scale divided
/// by export DPI). Does nothing when the box cannot hold the smallest rung.
pub fn draw_scale_bar(
    canvas: &mut Canvas,
    rect: PixelRect,
    ground_per_px: f64,
    units: Units,
    text: &TextRenderer,
) {
    if rect.width == 0 || rect.height == 0 || ground_per_px <= 0.0 {
        return;
    }
    let usable_px = rect.width as f64 * BAR_SPAN_FRACTION;
    let Some(bar_ground) = select_bar_length(usable_px * ground_per_px) else {
        return;
    };
    let bar_px = (bar_ground / ground_per_px).round() as i32;

    let bar_h = ((rect.height as f32 * 0.22).round() as i32).clamp(4, 14);
    let font_size = ((rect.height as f32) * 0.3).clamp(9.0, 16.0);
    let label = units.format_length(bar_ground);

    let bar_x = rect.x + (rect.width as i32 - bar_px) / 2;
    let label_h = text.line_height(font_size).ceil() as i32;
    let bar_y = rect.y + (rect.height as i32 - bar_h - label_h - 2) / 2;

    // 4 alternating segments
    let seg_w = bar_px as f64 / 4.0;
    for i in 0..4 {
        let x0 = bar_x + (seg_w * i as f64).round() as i32;
        let x1 = bar_x + (seg_w * (i + 1) as f64).round() as i32;
        let seg = PixelRect::new(x0, bar_y, (x1 - x0).max(0) as u32, bar_h as u32);
        if i % 2 == 0 {
            canvas.fill_rect(seg, Color::BLACK);
        } else {
            canvas.fill_rect(seg, Color::WHITE);
        }
    }
    canvas.stroke_rect(
        PixelRect::new(bar_x, bar_y, bar_px as u32, bar_h as u32),
        Color::BLACK,
        1,
    );

    // end ticks extend above the bar
    let tick_rise = (bar_h / 2).max(2);
    canvas.line(bar_x, bar_y - tick_rise, bar_x, bar_y, Color::BLACK);
    canvas.line(
        bar_x + bar_px,
        bar_y - tick_rise,
        bar_x + bar_px,
        bar_y,
        Color::BLACK,
    );

    // centered label below the bar
    let label_w = text.measure(&label, font_size, false);
    let label_x = bar_x as f32 + (bar_px as f32 - label_w) / 2.0;
    text.draw(
        canvas,
        &label,
        label_x,
        (bar_y + bar_h + 2) as f32,
        font_size,
        Color::BLACK,
        false,
    );
}
