//! # Legend Model
//!
//! Legend items are constructed fresh for every export from a normalized
//! layer description — never persisted. A layer with a single symbol
//! flattens to one item; a layer with unique-value or class-break classes
//! flattens to a header item followed by one sub-item per class, and that
//! header/children group stays contiguous all the way through layout.

pub mod layout;

pub use layout::{LegendLayout, assign_positions, layout_legend};

use serde::{Deserialize, Serialize};

use crate::render::color::Color;

/// The swatch drawn next to a legend label.
///
/// The kind tag is decided once here at the ingestion boundary; renderers
/// never inspect colors or geometry to guess what a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegendSymbol {
    /// An area symbol: filled box with an optional outline.
    Fill {
        color: Color,
        #[serde(default)]
        outline: Option<Color>,
        /// Hollow fill: only the outline is drawn.
        #[serde(default)]
        transparent_fill: bool,
    },
    /// A line symbol: a single stroke.
    Line { color: Color },
}

/// One entry in the map's symbol key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    #[serde(default)]
    pub symbol: Option<LegendSymbol>,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default)]
    pub is_sub_item: bool,
}

impl LegendItem {
    /// A plain item: label plus symbol, no grouping.
    pub fn plain(label: impl Into<String>, symbol: LegendSymbol) -> Self {
        Self {
            label: label.into(),
            symbol: Some(symbol),
            is_header: false,
            is_sub_item: false,
        }
    }

    /// A group header (layer title above its classes). No symbol.
    pub fn header(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: None,
            is_header: true,
            is_sub_item: false,
        }
    }

    /// An indented class entry below a header.
    pub fn sub_item(label: impl Into<String>, symbol: LegendSymbol) -> Self {
        Self {
            label: label.into(),
            symbol: Some(symbol),
            is_header: false,
            is_sub_item: true,
        }
    }
}

/// One class of a multi-class renderer (a unique value or a class break).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererClass {
    pub label: String,
    pub symbol: LegendSymbol,
}

/// Normalized renderer description from the legend data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum RendererDef {
    Simple { symbol: LegendSymbol },
    UniqueValues { classes: Vec<RendererClass> },
    ClassBreaks { classes: Vec<RendererClass> },
}

/// A visible layer as reported by the legend data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub title: String,
    #[serde(flatten)]
    pub renderer: RendererDef,
}

/// Flatten visible layers into the ordered legend item list.
pub fn flatten_layers(layers: &[LayerInfo]) -> Vec<LegendItem> {
    let mut items = Vec::new();
    for layer in layers {
        match &layer.renderer {
            RendererDef::Simple { symbol } => {
                items.push(LegendItem::plain(&layer.title, *symbol));
            }
            RendererDef::UniqueValues { classes } | RendererDef::ClassBreaks { classes } => {
                items.push(LegendItem::header(&layer.title));
                for class in classes {
                    items.push(LegendItem::sub_item(&class.label, class.symbol));
                }
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(color: Color) -> LegendSymbol {
        LegendSymbol::Fill {
            color,
            outline: Some(Color::BLACK),
            transparent_fill: false,
        }
    }

    #[test]
    fn simple_renderer_flattens_to_one_item() {
        let layers = [LayerInfo {
            title: "Parcels".into(),
            renderer: RendererDef::Simple {
                symbol: fill(Color::rgb(230, 230, 200)),
            },
        }];
        let items = flatten_layers(&layers);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Parcels");
        assert!(!items[0].is_header);
        assert!(items[0].symbol.is_some());
    }

    #[test]
    fn class_renderer_flattens_to_header_plus_children() {
        let layers = [LayerInfo {
            title: "Zoning".into(),
            renderer: RendererDef::UniqueValues {
                classes: vec![
                    RendererClass {
                        label: "Residential".into(),
                        symbol: fill(Color::rgb(255, 255, 190)),
                    },
                    RendererClass {
                        label: "Commercial".into(),
                        symbol: fill(Color::rgb(255, 190, 190)),
                    },
                ],
            },
        }];
        let items = flatten_layers(&layers);
        assert_eq!(items.len(), 3);
        assert!(items[0].is_header);
        assert_eq!(items[0].symbol, None);
        assert!(items[1].is_sub_item);
        assert!(items[2].is_sub_item);
        assert_eq!(items[2].label, "Commercial");
    }

    #[test]
    fn groups_stay_contiguous_in_document_order() {
        let layers = [
            LayerInfo {
                title: "Roads".into(),
                renderer: RendererDef::ClassBreaks {
                    classes: vec![
                        RendererClass {
                            label: "< 2 lanes".into(),
                            symbol: LegendSymbol::Line {
                                color: Color::rgb(120, 120, 120),
                            },
                        },
                        RendererClass {
                            label: ">= 2 lanes".into(),
                            symbol: LegendSymbol::Line { color: Color::BLACK },
                        },
                    ],
                },
            },
            LayerInfo {
                title: "Hydrants".into(),
                renderer: RendererDef::Simple {
                    symbol: fill(Color::rgb(255, 0, 0)),
                },
            },
        ];
        let items = flatten_layers(&layers);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Roads", "< 2 lanes", ">= 2 lanes", "Hydrants"]);
    }

    #[test]
    fn layer_json_round_trips() {
        let json = r##"{"title": "Soils", "renderer": "class_breaks", "classes": [
            {"label": "0-2%", "symbol": {"kind": "fill", "color": "#eeddcc"}}
        ]}"##;
        let layer: LayerInfo = serde_json::from_str(json).unwrap();
        assert_eq!(layer.title, "Soils");
        assert!(matches!(layer.renderer, RendererDef::ClassBreaks { .. }));
    }
}
