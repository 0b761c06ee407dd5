//! Scale resolution: from a template and a requested ground scale to the
//! geographic window that will be captured for the map element.
//!
//! With an explicit scale, the window's ground dimensions are the map
//! element's physical inch dimensions multiplied by the scale, centered on
//! the current view center. With auto-fit (`None`), the window is the
//! view's current extent and the scale is back-computed from it.

use crate::error::CartaError;
use crate::geo::{ExportArea, MapExtent, MapPoint};
use crate::template::Template;

/// Physical (width, height) of the template's map element, in inches.
fn map_physical_inches(template: &Template) -> Result<(f64, f64), CartaError> {
    let map = template.map_element().ok_or(CartaError::MissingMapElement)?;
    let (page_w, page_h) = template.page_size.dimensions_in();
    let w = map.frame.width / 100.0 * page_w;
    let h = map.frame.height / 100.0 * page_h;
    if w <= 0.0 || h <= 0.0 {
        return Err(CartaError::InvalidTemplate(
            "map element has zero size".into(),
        ));
    }
    Ok((w, h))
}

/// Resolve the export area for a template.
///
/// `explicit_scale` is in ground units per inch; `None` means auto-fit to
/// the current view extent.
pub fn resolve_export_area(
    template: &Template,
    explicit_scale: Option<f64>,
    view_extent: &MapExtent,
) -> Result<ExportArea, CartaError> {
    let (phys_w, phys_h) = map_physical_inches(template)?;
    match explicit_scale {
        Some(scale) => {
            if scale <= 0.0 {
                return Err(CartaError::InvalidTemplate(format!(
                    "scale {} must be positive",
                    scale
                )));
            }
            let extent =
                MapExtent::from_center(view_extent.center(), scale * phys_w, scale * phys_h);
            Ok(ExportArea { extent, scale })
        }
        None => {
            let scale = view_extent.width() / phys_w;
            Ok(ExportArea {
                extent: *view_extent,
                scale,
            })
        }
    }
}

/// Move an export area's anchor: the same window, same scale, translated to
/// a new center.
pub fn reposition(area: &ExportArea, new_center: MapPoint) -> ExportArea {
    ExportArea {
        extent: MapExtent::from_center(new_center, area.extent.width(), area.extent.height()),
        scale: area.scale,
    }
}
