//! Text measurement and rasterization.
//!
//! Renders anti-aliased text onto the canvas using ab_glyph. Faces are
//! loaded at runtime, from an explicit path or from a short list of common
//! system locations. When no face can be loaded, measurement falls back to
//! a per-character advance estimate and drawing falls back to a baseline
//! rule, so layout decisions (legend columns, word wrap) behave identically
//! with or without fonts installed.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use tracing::debug;

use super::canvas::Canvas;
use super::color::Color;

/// System font files probed in order when no explicit path is given.
const SYSTEM_FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
];

/// Text measurement and drawing, with or without a loaded face.
pub struct TextRenderer {
    regular: Option<FontArc>,
    bold: Option<FontArc>,
}

impl TextRenderer {
    /// Probe common system font locations.
    ///
    /// Missing fonts are not an error; the renderer degrades to estimated
    /// metrics, which keeps layout deterministic in fontless environments.
    pub fn from_system() -> Self {
        for (regular_path, bold_path) in SYSTEM_FONT_CANDIDATES {
            if let Ok(data) = std::fs::read(regular_path)
                && let Ok(face) = FontArc::try_from_vec(data)
            {
                let bold = std::fs::read(bold_path)
                    .ok()
                    .and_then(|d| FontArc::try_from_vec(d).ok());
                return Self {
                    regular: Some(face),
                    bold,
                };
            }
        }
        debug!("no system font found; using estimated text metrics");
        Self::estimated()
    }

    /// Load faces from explicit TTF/OTF bytes.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Option<Self> {
        let regular = FontArc::try_from_vec(regular).ok()?;
        let bold = bold.and_then(|d| FontArc::try_from_vec(d).ok());
        Some(Self {
            regular: Some(regular),
            bold,
        })
    }

    /// A renderer with no faces: estimated measurement, placeholder drawing.
    ///
    /// Used by tests that need measurement to be platform-independent.
    pub fn estimated() -> Self {
        Self {
            regular: None,
            bold: None,
        }
    }

    pub fn has_face(&self) -> bool {
        self.regular.is_some()
    }

    fn face(&self, bold: bool) -> Option<&FontArc> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref()
        }
    }

    /// Width in pixels of `text` at `size` pixels tall.
    pub fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        match self.face(bold) {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                let mut width = 0.0f32;
                let mut prev = None;
                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width
            }
            None => estimate_width_units(text, bold) * size,
        }
    }

    /// Line height (ascent − descent) in pixels at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        match self.face(false) {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                scaled.ascent() - scaled.descent()
            }
            None => size * 1.2,
        }
    }

    /// Greedy word wrap: accumulate words until the measured line width
    /// would exceed `max_width`, then break. A single word wider than the
    /// box gets its own line rather than being split.
    pub fn wrap(&self, text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", current, word)
                };
                if !current.is_empty() && self.measure(&candidate, size, bold) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            if !current.is_empty() || paragraph.is_empty() {
                lines.push(current);
            }
        }
        lines
    }

    /// Draw a single line with its top edge at `y`.
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        bold: bool,
    ) {
        match self.face(bold) {
            Some(font) => {
                let font = font.clone();
                let scaled = font.as_scaled(PxScale::from(size));
                let baseline = y + scaled.ascent();
                let mut caret = x;
                let mut prev = None;
                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    let glyph = id.with_scale_and_position(
                        PxScale::from(size),
                        ab_glyph::point(caret, baseline),
                    );
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|px, py, coverage| {
                            canvas.put_coverage(
                                px as i32 + bounds.min.x as i32,
                                py as i32 + bounds.min.y as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
            }
            None => {
                // No face available: draw a thin rule where the baseline
                // would be so fontless output still shows text placement.
                let width = self.measure(text, size, bold).round() as i32;
                let by = (y + size).round() as i32;
                canvas.line(x as i32, by, x as i32 + width, by, color);
            }
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::from_system()
    }
}

/// Width estimate in em units for a character, summed over a string.
///
/// Classes match the coarse proportions of common sans faces so that the
/// estimate and a real face agree on which label is longest.
fn estimate_width_units(text: &str, bold: bool) -> f32 {
    let base: f32 = text
        .chars()
        .map(|ch| match ch {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.30,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.38,
            'm' | 'w' | 'M' | 'W' | '@' => 0.85,
            ' ' => 0.30,
            '0'..='9' => 0.55,
            'A'..='Z' => 0.68,
            _ => 0.52,
        })
        .sum();
    if bold { base * 1.06 } else { base }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_measure_scales_linearly() {
        let t = TextRenderer::estimated();
        let w10 = t.measure("Road Centerlines", 10.0, false);
        let w20 = t.measure("Road Centerlines", 20.0, false);
        assert!((w20 - 2.0 * w10).abs() < 1e-3);
    }

    #[test]
    fn estimated_measure_orders_by_length() {
        let t = TextRenderer::estimated();
        assert!(t.measure("Parcels", 12.0, false) < t.measure("Hydrography Features", 12.0, false));
    }

    #[test]
    fn bold_measures_wider() {
        let t = TextRenderer::estimated();
        assert!(t.measure("Zoning", 12.0, true) > t.measure("Zoning", 12.0, false));
    }

    #[test]
    fn wrap_breaks_on_measured_width() {
        let t = TextRenderer::estimated();
        let one_word = t.measure("surveyed", 12.0, false);
        // allow roughly two words per line
        let lines = t.wrap("surveyed parcels are shown in heavy outline", 12.0, false, one_word * 2.4);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(
                t.measure(line, 12.0, false) <= one_word * 2.4 + 0.01
                    || !line.contains(' '),
                "line '{line}' overflows"
            );
        }
    }

    #[test]
    fn wrap_preserves_explicit_newlines() {
        let t = TextRenderer::estimated();
        let lines = t.wrap("first\nsecond", 12.0, false, 10_000.0);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn wrap_single_long_word_gets_own_line() {
        let t = TextRenderer::estimated();
        let lines = t.wrap("antidisestablishmentarianism", 12.0, false, 20.0);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn fontless_draw_leaves_marks() {
        let t = TextRenderer::estimated();
        let mut c = Canvas::new(100, 30, Color::WHITE);
        t.draw(&mut c, "hello", 2.0, 2.0, 12.0, Color::BLACK, false);
        let any_dark = c.image().pixels().any(|p| p.0[0] < 128);
        assert!(any_dark);
    }
}
