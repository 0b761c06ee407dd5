//! Legend rendering.
//!
//! Draws the computed [`LegendLayout`](crate::legend::LegendLayout): an
//! optional background and title band, then items flowing down each column
//! with swatches sized by the layout and labels at the derived font size.

use crate::legend::{LegendItem, LegendSymbol, assign_positions, layout_legend};
use crate::legend::layout::TITLE_FONT_SIZE;

use super::canvas::{Canvas, PixelRect};
use super::color::Color;
use super::text::TextRenderer;

/// Draw a legend into `rect` from an already-flattened item list.
pub fn draw_legend(
    canvas: &mut Canvas,
    rect: PixelRect,
    items: &[LegendItem],
    title: &str,
    show_title: bool,
    background: Option<Color>,
    text: &TextRenderer,
) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    if let Some(bg) = background
        && !bg.is_transparent()
    {
        canvas.fill_rect(rect, bg);
    }

    let show_title = show_title && !title.is_empty();
    let layout = layout_legend(
        rect.width as f32,
        rect.height as f32,
        items,
        show_title,
        text,
    );

    let origin_x = rect.x as f32 + layout.padding;
    let origin_y = rect.y as f32 + layout.padding;

    if show_title {
        text.draw(
            canvas,
            title,
            origin_x,
            origin_y,
            TITLE_FONT_SIZE,
            Color::BLACK,
            true,
        );
    }

    let positions = assign_positions(items, layout.items_per_column, layout.num_columns);
    for (item, (col, row)) in items.iter().zip(positions) {
        let cell_x = origin_x + col as f32 * (layout.column_width + layout.column_gap);
        let cell_y = origin_y + layout.title_height + row as f32 * layout.item_height;
        draw_item(canvas, item, cell_x, cell_y, &layout, text);
    }
}

fn draw_item(
    canvas: &mut Canvas,
    item: &LegendItem,
    cell_x: f32,
    cell_y: f32,
    layout: &crate::legend::LegendLayout,
    text: &TextRenderer,
) {
    let indent = if item.is_sub_item {
        layout.sub_item_indent
    } else {
        0.0
    };
    let mut label_x = cell_x + indent;

    if let Some(symbol) = &item.symbol {
        let size = layout.symbol_size;
        let sym_y = cell_y + (layout.item_height - size) / 2.0;
        draw_symbol(canvas, symbol, cell_x + indent, sym_y, size);
        label_x += size + 6.0;
    }

    let label_y = cell_y + (layout.item_height - text.line_height(layout.font_size)) / 2.0;
    text.draw(
        canvas,
        &item.label,
        label_x,
        label_y.max(cell_y),
        layout.font_size,
        Color::BLACK,
        item.is_header,
    );
}

fn draw_symbol(canvas: &mut Canvas, symbol: &LegendSymbol, x: f32, y: f32, size: f32) {
    let px = PixelRect::new(x.round() as i32, y.round() as i32, size as u32, size as u32);
    match symbol {
        LegendSymbol::Fill {
            color,
            outline,
            transparent_fill,
        } => {
            if !transparent_fill {
                canvas.fill_rect(px, *color);
            }
            let outline = outline.unwrap_or(Color::BLACK);
            canvas.stroke_rect(px, outline, 1);
        }
        LegendSymbol::Line { color } => {
            let mid = px.y + px.height as i32 / 2;
            canvas.fill_rect(PixelRect::new(px.x, mid - 1, px.width, 2), *color);
        }
    }
}
