//! # Page Template Model
//!
//! A single type hierarchy that is both the Rust API and the JSON API.
//! `Template` is constructible in Rust and deserializable from JSON.
//!
//! All element geometry is a **percentage of page width/height**, which
//! decouples template authoring from output DPI: the same template renders
//! at 96 DPI for a screen preview and 150+ DPI for print without edits.
//! Percentages may overlap and need not sum to anything; paint order is
//! document order (later elements paint over earlier ones).
//!
//! ```ignore
//! use carta::template::*;
//!
//! let t: Template = serde_json::from_str(r#"{
//!     "elements": [
//!         {"type": "map", "x": 2, "y": 10, "width": 96, "height": 80},
//!         {"type": "title", "x": 2, "y": 2, "width": 96, "height": 7,
//!          "text": "Flood Zones", "font_size": 28, "bold": true}
//!     ]
//! }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CartaError;
use crate::render::canvas::PixelRect;
use crate::render::color::Color;
use crate::render::scalebar::Units;

/// Physical page size. Maps to width/height in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    #[default]
    Letter,
    Tabloid,
    AnsiC,
    AnsiD,
    Custom {
        width_in: f64,
        height_in: f64,
    },
}

impl PageSize {
    /// Physical (width, height) in inches.
    pub fn dimensions_in(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (8.5, 11.0),
            PageSize::Tabloid => (11.0, 17.0),
            PageSize::AnsiC => (17.0, 22.0),
            PageSize::AnsiD => (22.0, 34.0),
            PageSize::Custom {
                width_in,
                height_in,
            } => (*width_in, *height_in),
        }
    }

    /// Same sheet rotated a quarter turn.
    pub fn landscape(&self) -> PageSize {
        let (w, h) = self.dimensions_in();
        PageSize::Custom {
            width_in: h,
            height_in: w,
        }
    }
}

/// Element position and size as percentages (0–100) of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to absolute pixels for a page of the given pixel dimensions.
    pub fn to_pixels(&self, page_width_px: u32, page_height_px: u32) -> PixelRect {
        let px = |pct: f64, total: u32| (pct / 100.0 * total as f64).round();
        PixelRect::new(
            px(self.x, page_width_px) as i32,
            px(self.y, page_height_px) as i32,
            px(self.width, page_width_px).max(0.0) as u32,
            px(self.height, page_height_px).max(0.0) as u32,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

fn default_font_size() -> f32 {
    14.0
}

fn default_true() -> bool {
    true
}

/// Text content and styling shared by title and text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default)]
    pub color: Color,
    /// Size in points at page scale (converted to pixels at export DPI).
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub background_color: Option<Color>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::BLACK,
            font_size: default_font_size(),
            bold: false,
            align: Align::Left,
            background_color: None,
        }
    }
}

/// The per-type content of an element.
///
/// The `#[serde(tag = "type")]` attribute enables JSON like
/// `{"type": "scale_bar", "units": "feet", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Map,
    Title {
        #[serde(flatten)]
        block: TextBlock,
    },
    Text {
        #[serde(flatten)]
        block: TextBlock,
    },
    Legend {
        #[serde(default)]
        title: String,
        #[serde(default = "default_true")]
        show_title: bool,
        #[serde(default)]
        background_color: Option<Color>,
    },
    ScaleBar {
        #[serde(default)]
        units: Units,
    },
    NorthArrow,
    Image {
        url: String,
    },
    Logo {
        url: String,
    },
}

impl ElementKind {
    /// Human-readable display label for UIs and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Map => "Map",
            ElementKind::Title { .. } => "Title",
            ElementKind::Text { .. } => "Text",
            ElementKind::Legend { .. } => "Legend",
            ElementKind::ScaleBar { .. } => "Scale Bar",
            ElementKind::NorthArrow => "North Arrow",
            ElementKind::Image { .. } => "Image",
            ElementKind::Logo { .. } => "Logo",
        }
    }
}

/// One page element: content plus its percentage frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Element {
    pub fn new(kind: ElementKind, frame: Frame) -> Self {
        Self {
            kind,
            frame,
            visible: true,
        }
    }
}

fn default_background() -> Color {
    Color::WHITE
}

/// A reusable page template: page size plus an ordered element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default = "default_background")]
    pub background_color: Color,
    pub elements: Vec<Element>,
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self, CartaError> {
        serde_json::from_str(json)
            .map_err(|e| CartaError::InvalidTemplate(format!("template JSON: {}", e)))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// The map element, if the template has one.
    pub fn map_element(&self) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| matches!(e.kind, ElementKind::Map))
    }

    /// Check the template is exportable: exactly one map element with a
    /// non-degenerate frame, and a positive page size.
    ///
    /// Runs before any view mutation so a bad template never touches the map.
    pub fn validate(&self) -> Result<(), CartaError> {
        let (w, h) = self.page_size.dimensions_in();
        if w <= 0.0 || h <= 0.0 {
            return Err(CartaError::InvalidTemplate(format!(
                "page size {}x{} in",
                w, h
            )));
        }
        let maps: Vec<&Element> = self
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Map))
            .collect();
        match maps.as_slice() {
            [] => Err(CartaError::MissingMapElement),
            [map] => {
                if map.frame.is_degenerate() {
                    Err(CartaError::InvalidTemplate(
                        "map element has zero size".into(),
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Err(CartaError::InvalidTemplate(format!(
                "{} map elements (exactly one required)",
                maps.len()
            ))),
        }
    }

    /// The stock 11×8.5 landscape sheet a fresh install starts from:
    /// title band, full-width map, legend, scale bar, and north arrow.
    pub fn letter_landscape_default() -> Template {
        Template {
            page_size: PageSize::Letter.landscape(),
            background_color: Color::WHITE,
            elements: vec![
                Element::new(
                    ElementKind::Title {
                        block: TextBlock {
                            font_size: 26.0,
                            bold: true,
                            align: Align::Center,
                            ..TextBlock::new("Map Export")
                        },
                    },
                    Frame::new(2.0, 1.5, 96.0, 7.0),
                ),
                Element::new(ElementKind::Map, Frame::new(2.0, 10.0, 96.0, 70.0)),
                Element::new(
                    ElementKind::Legend {
                        title: "Legend".into(),
                        show_title: true,
                        background_color: Some(Color::WHITE),
                    },
                    Frame::new(2.0, 82.0, 46.0, 16.0),
                ),
                Element::new(
                    ElementKind::ScaleBar {
                        units: Units::Feet,
                    },
                    Frame::new(52.0, 84.0, 30.0, 8.0),
                ),
                Element::new(ElementKind::NorthArrow, Frame::new(88.0, 82.0, 10.0, 16.0)),
            ],
        }
    }
}
