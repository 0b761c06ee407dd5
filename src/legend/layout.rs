//! Legend layout search.
//!
//! Given a bounding box and an ordered item list, choose the smallest
//! number of columns that holds every item, and within that column count
//! the largest item size (font + symbol) whose labels all still fit their
//! column at measured width. Fewer columns always beat larger items, so
//! the legend reads as a compact block first.
//!
//! The search is a pure function over immutable inputs: identical inputs
//! produce identical layouts, with no hidden state.

use super::LegendItem;
use crate::render::text::TextRenderer;

const ITEM_HEIGHT_MAX: f32 = 28.0;
const ITEM_HEIGHT_MIN: f32 = 14.0;
const ITEM_HEIGHT_STEP: f32 = 2.0;

const FONT_SIZE_MAX: f32 = 13.0;
const FONT_SIZE_MIN: f32 = 8.0;

const SYMBOL_SIZE_MAX: f32 = 18.0;
const SYMBOL_SIZE_MIN: f32 = 10.0;

const PADDING: f32 = 6.0;
const COLUMN_GAP: f32 = 12.0;
const SUB_ITEM_INDENT: f32 = 12.0;
const SYMBOL_LABEL_GAP: f32 = 6.0;

/// Visual cap on the column count; the overflow fallback may exceed it.
const MAX_COLUMNS: usize = 4;

pub const TITLE_FONT_SIZE: f32 = 14.0;
const TITLE_BAND_HEIGHT: f32 = 20.0;

/// The computed legend arrangement. Derived per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub num_columns: usize,
    pub column_width: f32,
    pub item_height: f32,
    pub font_size: f32,
    pub symbol_size: f32,
    pub items_per_column: usize,
    pub padding: f32,
    pub column_gap: f32,
    pub sub_item_indent: f32,
    /// Vertical space reserved above the columns for the legend title.
    pub title_height: f32,
}

/// Linear interpolation of `lo..hi` keyed to where `h` falls in the item
/// height range.
fn size_for_height(h: f32, lo: f32, hi: f32) -> f32 {
    let t = ((h - ITEM_HEIGHT_MIN) / (ITEM_HEIGHT_MAX - ITEM_HEIGHT_MIN)).clamp(0.0, 1.0);
    lo + t * (hi - lo)
}

/// Horizontal space an item's swatch and indent consume before its label.
fn symbol_space(item: &LegendItem, symbol_size: f32) -> f32 {
    let indent = if item.is_sub_item { SUB_ITEM_INDENT } else { 0.0 };
    if item.symbol.is_some() {
        indent + symbol_size + SYMBOL_LABEL_GAP
    } else {
        indent
    }
}

/// Measured width of an item's label at a candidate font size.
/// Headers render bold, so they measure bold.
fn label_width(item: &LegendItem, font_size: f32, text: &TextRenderer) -> f32 {
    text.measure(&item.label, font_size, item.is_header)
}

/// Choose the legend arrangement for a bounding box.
///
/// Candidate column counts run from 1 up to what the box width can support
/// at minimum column width (capped at 4). Within a column count, item
/// height scans from the maximum down in coarse steps; the first pair that
/// both holds every item and passes label measurement wins. Single-column
/// layouts skip the label check, since with one column there is no
/// narrower alternative to fall back to. When nothing verifies, the minimum item
/// size is used with however many columns the count requires, accepting
/// overflow.
pub fn layout_legend(
    width: f32,
    height: f32,
    items: &[LegendItem],
    show_title: bool,
    text: &TextRenderer,
) -> LegendLayout {
    let title_height = if show_title { TITLE_BAND_HEIGHT } else { 0.0 };
    let avail_w = (width - 2.0 * PADDING).max(1.0);
    let avail_h = (height - 2.0 * PADDING - title_height).max(1.0);

    let make = |num_columns: usize, items_per_column: usize, item_height: f32| LegendLayout {
        num_columns,
        column_width: column_width(avail_w, num_columns),
        item_height,
        font_size: size_for_height(item_height, FONT_SIZE_MIN, FONT_SIZE_MAX),
        symbol_size: size_for_height(item_height, SYMBOL_SIZE_MIN, SYMBOL_SIZE_MAX),
        items_per_column,
        padding: PADDING,
        column_gap: COLUMN_GAP,
        sub_item_indent: SUB_ITEM_INDENT,
        title_height,
    };

    if items.is_empty() {
        return make(1, 0, ITEM_HEIGHT_MAX);
    }

    // Minimum viable column width, from the longest label at the smallest
    // font, bounds how many columns the box can support.
    let min_col_w = items
        .iter()
        .map(|it| label_width(it, FONT_SIZE_MIN, text) + symbol_space(it, SYMBOL_SIZE_MIN))
        .fold(1.0f32, f32::max);
    let supportable =
        (((avail_w + COLUMN_GAP) / (min_col_w + COLUMN_GAP)).floor() as usize).max(1);
    let max_columns = supportable.min(MAX_COLUMNS);

    for num_columns in 1..=max_columns {
        let col_w = column_width(avail_w, num_columns);
        let mut item_height = ITEM_HEIGHT_MAX;
        while item_height >= ITEM_HEIGHT_MIN - f32::EPSILON {
            let items_per_column = (avail_h / item_height).floor() as usize;
            if items_per_column > 0 && items_per_column * num_columns >= items.len() {
                let candidate = make(num_columns, items_per_column, item_height);
                if num_columns == 1 || labels_fit(items, &candidate, col_w, text) {
                    return candidate;
                }
            }
            item_height -= ITEM_HEIGHT_STEP;
        }
    }

    // Nothing verified: minimum size, as many columns as arithmetic
    // requires, label overflow accepted.
    let items_per_column = ((avail_h / ITEM_HEIGHT_MIN).floor() as usize).max(1);
    let num_columns = items.len().div_ceil(items_per_column);
    make(num_columns, items_per_column, ITEM_HEIGHT_MIN)
}

fn column_width(avail_w: f32, num_columns: usize) -> f32 {
    ((avail_w - COLUMN_GAP * (num_columns - 1) as f32) / num_columns as f32).max(1.0)
}

fn labels_fit(
    items: &[LegendItem],
    layout: &LegendLayout,
    column_width: f32,
    text: &TextRenderer,
) -> bool {
    items.iter().all(|it| {
        label_width(it, layout.font_size, text) + symbol_space(it, layout.symbol_size)
            <= column_width
    })
}

/// Assign each item a (column, row) slot.
///
/// Items fill columns top to bottom in order. A header that would land on
/// the last row of a column, separating it from every one of its children,
/// is pushed to the top of the next column instead, when the layout has
/// spare capacity and a next column to push into.
pub fn assign_positions(
    items: &[LegendItem],
    items_per_column: usize,
    num_columns: usize,
) -> Vec<(usize, usize)> {
    if items.is_empty() || items_per_column == 0 {
        return items.iter().map(|_| (0, 0)).collect();
    }
    let capacity = items_per_column * num_columns;
    let mut slack = capacity.saturating_sub(items.len());
    let mut positions = Vec::with_capacity(items.len());
    let mut col = 0usize;
    let mut row = 0usize;

    for (i, item) in items.iter().enumerate() {
        let header_would_orphan = row + 1 == items_per_column
            && item.is_header
            && items.get(i + 1).is_some_and(|next| next.is_sub_item);
        if header_would_orphan && slack > 0 && col + 1 < num_columns {
            slack -= 1;
            col += 1;
            row = 0;
        }
        positions.push((col, row));
        row += 1;
        if row >= items_per_column {
            row = 0;
            col += 1;
        }
    }
    positions
}
