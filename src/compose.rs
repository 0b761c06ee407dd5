//! # Compositor
//!
//! Walks a template's elements in document order, converts each percentage
//! frame to absolute pixels at the export DPI, and dispatches to the
//! matching renderer. Later elements paint over earlier ones.
//!
//! Failure policy: a missing or broken map element aborts the export
//! before any view mutation; any other element's failure is caught, logged,
//! and recorded as a warning — the sheet is still produced.

use image::RgbaImage;
use tracing::{info, warn};

use crate::capture::{CaptureOptions, MapView, capture_map};
use crate::context::ExportContext;
use crate::error::CartaError;
use crate::geo::ExportArea;
use crate::legend::{LayerInfo, LegendItem, flatten_layers};
use crate::render::canvas::{Canvas, PixelRect};
use crate::render::color::Color;
use crate::render::{legend, north_arrow, scalebar};
use crate::scale::resolve_export_area;
use crate::template::{Align, Element, ElementKind, Template, TextBlock};

/// Print resolution used when the caller does not override it.
pub const DEFAULT_EXPORT_DPI: f64 = 150.0;

/// Per-export settings. All data, no code paths.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output resolution in pixels per page inch.
    pub dpi: f64,
    /// Ground units per inch, or `None` to auto-fit the current view.
    pub scale: Option<f64>,
    pub capture: CaptureOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_EXPORT_DPI,
            scale: None,
            capture: CaptureOptions::default(),
        }
    }
}

/// The composited sheet plus everything the exporter needs to encode it.
pub struct ExportOutput {
    pub surface: RgbaImage,
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub dpi: f64,
    /// Non-fatal element problems, in document order.
    pub warnings: Vec<String>,
}

/// Composes one template against one map view.
pub struct Compositor<'a> {
    view: &'a dyn MapView,
    ctx: &'a ExportContext,
    options: ExportOptions,
}

impl<'a> Compositor<'a> {
    pub fn new(view: &'a dyn MapView, ctx: &'a ExportContext, options: ExportOptions) -> Self {
        Self { view, ctx, options }
    }

    /// Render the template to a finished page surface.
    ///
    /// Validation and scale resolution run before any capture, so a bad
    /// template fails without touching the view.
    pub async fn render(
        &self,
        template: &Template,
        layers: &[LayerInfo],
    ) -> Result<ExportOutput, CartaError> {
        template.validate()?;

        let (page_w_in, page_h_in) = template.page_size.dimensions_in();
        let page_w_px = (page_w_in * self.options.dpi).round() as u32;
        let page_h_px = (page_h_in * self.options.dpi).round() as u32;

        let view_extent = self.view.current_extent().await;
        let area = resolve_export_area(template, self.options.scale, &view_extent)?;
        let items = flatten_layers(layers);

        info!(
            page = %format!("{page_w_px}x{page_h_px}"),
            scale = area.scale,
            elements = template.elements.len(),
            "composing sheet"
        );

        let mut canvas = Canvas::new(page_w_px, page_h_px, template.background_color);
        let mut warnings = Vec::new();

        for element in &template.elements {
            if !element.visible {
                continue;
            }
            let rect = element.frame.to_pixels(page_w_px, page_h_px);
            if matches!(element.kind, ElementKind::Map) {
                self.render_map(&mut canvas, rect, &area).await?;
            } else if let Err(e) = self
                .render_element(&mut canvas, element, rect, &area, &items)
                .await
            {
                warn!(element = element.kind.label(), error = %e, "element skipped");
                warnings.push(format!("{} skipped: {}", element.kind.label(), e));
            }
        }

        Ok(ExportOutput {
            surface: canvas.into_image(),
            page_width_in: page_w_in,
            page_height_in: page_h_in,
            dpi: self.options.dpi,
            warnings,
        })
    }

    async fn render_map(
        &self,
        canvas: &mut Canvas,
        rect: PixelRect,
        area: &ExportArea,
    ) -> Result<(), CartaError> {
        let raster = capture_map(
            self.view,
            area,
            rect.width.max(1),
            rect.height.max(1),
            &self.options.capture,
        )
        .await?;
        canvas.blit(&raster, rect.x, rect.y);
        canvas.stroke_rect(rect, Color::BLACK, 1);
        Ok(())
    }

    async fn render_element(
        &self,
        canvas: &mut Canvas,
        element: &Element,
        rect: PixelRect,
        area: &ExportArea,
        items: &[LegendItem],
    ) -> Result<(), CartaError> {
        match &element.kind {
            ElementKind::Map => unreachable!("map handled by render_map"),
            ElementKind::Title { block } => {
                self.draw_text_block(canvas, rect, block, false);
                Ok(())
            }
            ElementKind::Text { block } => {
                self.draw_text_block(canvas, rect, block, true);
                Ok(())
            }
            ElementKind::Legend {
                title,
                show_title,
                background_color,
            } => {
                legend::draw_legend(
                    canvas,
                    rect,
                    items,
                    title,
                    *show_title,
                    *background_color,
                    &self.ctx.fonts,
                );
                Ok(())
            }
            ElementKind::ScaleBar { units } => {
                let ground_per_px = area.scale / self.options.dpi;
                scalebar::draw_scale_bar(canvas, rect, ground_per_px, *units, &self.ctx.fonts);
                Ok(())
            }
            ElementKind::NorthArrow => {
                north_arrow::draw_north_arrow(canvas, rect, &self.ctx.fonts);
                Ok(())
            }
            ElementKind::Image { url } | ElementKind::Logo { url } => {
                let image = self.ctx.fetch_image(url).await?;
                canvas.blit_fitted(&image.to_rgba8(), rect);
                Ok(())
            }
        }
    }

    /// Draw a title or text block: optional background, aligned lines.
    ///
    /// `wrap` selects the multi-line text behavior; titles keep their
    /// explicit lines. Overflow below the box is not clipped; long text
    /// stays fully readable on the sheet.
    fn draw_text_block(&self, canvas: &mut Canvas, rect: PixelRect, block: &TextBlock, wrap: bool) {
        if let Some(bg) = block.background_color
            && !bg.is_transparent()
        {
            canvas.fill_rect(rect, bg);
        }

        let fonts = &self.ctx.fonts;
        // font_size is points at page scale; convert to output pixels
        let size_px = block.font_size * (self.options.dpi as f32) / 72.0;
        let lines = if wrap {
            fonts.wrap(&block.text, size_px, block.bold, rect.width as f32)
        } else {
            block.text.split('\n').map(str::to_string).collect()
        };

        let line_h = fonts.line_height(size_px);
        let mut y = rect.y as f32 + 2.0;
        for line in &lines {
            let width = fonts.measure(line, size_px, block.bold);
            let x = match block.align {
                Align::Left => rect.x as f32 + 2.0,
                Align::Center => rect.x as f32 + (rect.width as f32 - width) / 2.0,
                Align::Right => rect.x as f32 + rect.width as f32 - width - 2.0,
            };
            fonts.draw(canvas, line, x, y, size_px, block.color, block.bold);
            y += line_h;
        }
    }
}
