//! # Capture Adapter
//!
//! Produces a raster exactly matching an [`ExportArea`] at a requested
//! pixel size, using a caller-supplied map-view capability.
//!
//! The view is the only shared mutable resource in the pipeline. Capture
//! acquires it as a scoped lease: the pre-capture state (extent, overlay
//! visibility) is saved before any mutation and restored on every exit
//! path, success or failure, so a failed export never leaves the live map
//! in a mutated state.

pub mod synthetic;

pub use synthetic::SyntheticMapView;

use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::CartaError;
use crate::geo::{ExportArea, MapExtent, MapPoint, ScreenPoint, ScreenRect};

/// The map-view capability consumed by the capture adapter.
///
/// Implementations wrap whatever actually renders the map: a GIS view
/// widget, a tile compositor, or the offline [`SyntheticMapView`].
#[async_trait]
pub trait MapView: Send + Sync {
    /// The currently visible geographic window.
    async fn current_extent(&self) -> MapExtent;

    /// Frame an extent without animation.
    async fn set_extent(&self, extent: MapExtent);

    /// Project a map point through the world-to-screen transform.
    async fn project_to_screen(&self, point: MapPoint) -> ScreenPoint;

    /// Capture a screen rectangle, resampled to `(out_width, out_height)`.
    async fn capture_region(
        &self,
        rect: ScreenRect,
        out_width: u32,
        out_height: u32,
    ) -> Result<RgbaImage, CartaError>;

    /// Whether imagery or tiles are still loading.
    async fn is_busy(&self) -> bool;

    /// Show or hide a transient overlay graphic by id.
    async fn set_overlay_visible(&self, id: &str, visible: bool);
}

/// Tuning for the capture protocol. All values are data, not code paths.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Fixed delay after the extent change before polling for settlement.
    pub settle_delay: Duration,
    /// Interval between busy polls.
    pub poll_interval: Duration,
    /// Hard cap on the settlement wait. A timeout is logged, not fatal;
    /// capture proceeds with whatever has loaded.
    pub settle_timeout: Duration,
    /// Overlay id of the export-area indicator, hidden during capture so
    /// the indicator does not appear in its own output.
    pub indicator_overlay_id: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            poll_interval: Duration::from_millis(100),
            settle_timeout: Duration::from_secs(5),
            indicator_overlay_id: None,
        }
    }
}

/// Capture `area` from the view as a raster of exactly
/// `(out_width, out_height)` pixels.
///
/// Protocol: hide the indicator overlay, frame the export extent, await
/// settlement (bounded), project the extent corners to the exact screen
/// rectangle, capture that rectangle resampled to the output size, then
/// restore the saved view state.
pub async fn capture_map(
    view: &dyn MapView,
    area: &ExportArea,
    out_width: u32,
    out_height: u32,
    options: &CaptureOptions,
) -> Result<RgbaImage, CartaError> {
    if out_width == 0 || out_height == 0 {
        return Err(CartaError::CaptureUnavailable(format!(
            "output size {}x{}",
            out_width, out_height
        )));
    }
    if area.extent.width() <= 0.0 || area.extent.height() <= 0.0 {
        return Err(CartaError::CaptureUnavailable(
            "export area is empty".into(),
        ));
    }

    // Scoped lease: save state, mutate, and restore below on both paths.
    let saved_extent = view.current_extent().await;
    if let Some(id) = &options.indicator_overlay_id {
        view.set_overlay_visible(id, false).await;
    }

    let result = capture_inner(view, area, out_width, out_height, options).await;

    view.set_extent(saved_extent).await;
    if let Some(id) = &options.indicator_overlay_id {
        view.set_overlay_visible(id, true).await;
    }
    debug!("view state restored after capture");

    result
}

async fn capture_inner(
    view: &dyn MapView,
    area: &ExportArea,
    out_width: u32,
    out_height: u32,
    options: &CaptureOptions,
) -> Result<RgbaImage, CartaError> {
    view.set_extent(area.extent).await;

    if !await_settlement(view, options).await {
        warn!(
            timeout_ms = options.settle_timeout.as_millis() as u64,
            "view still busy at settle timeout; capturing best-effort imagery"
        );
    }

    // The view's aspect ratio need not match the export area's. Project the
    // four corners through the world-to-screen transform and capture their
    // bounding rectangle — a naive viewport screenshot would add margin or
    // crop.
    let mut projected = Vec::with_capacity(4);
    for corner in area.extent.corners() {
        projected.push(view.project_to_screen(corner).await);
    }
    let rect = ScreenRect::bounding(&projected)
        .ok_or_else(|| CartaError::CaptureUnavailable("no projected corners".into()))?;
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(CartaError::CaptureUnavailable(format!(
            "projected capture rect is degenerate: {}x{}",
            rect.width, rect.height
        )));
    }

    view.capture_region(rect, out_width, out_height).await
}

/// Wait for the view to finish loading imagery.
///
/// Returns `false` when the timeout elapsed with the view still busy.
async fn await_settlement(view: &dyn MapView, options: &CaptureOptions) -> bool {
    tokio::time::sleep(options.settle_delay).await;
    let deadline = Instant::now() + options.settle_timeout;
    while view.is_busy().await {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(options.poll_interval).await;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::MapExtent;

    fn fast_options() -> CaptureOptions {
        CaptureOptions {
            settle_delay: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
            settle_timeout: Duration::from_millis(30),
            indicator_overlay_id: Some("export-indicator".into()),
        }
    }

    fn area(extent: MapExtent) -> ExportArea {
        ExportArea {
            extent,
            scale: 100.0,
        }
    }

    #[tokio::test]
    async fn capture_returns_requested_size() {
        let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 4000.0, 3000.0), 800, 600);
        let img = capture_map(
            &view,
            &area(MapExtent::new(500.0, 500.0, 2500.0, 2000.0)),
            640,
            480,
            &fast_options(),
        )
        .await
        .unwrap();
        assert_eq!((img.width(), img.height()), (640, 480));
    }

    #[tokio::test]
    async fn view_state_restored_after_success() {
        let start = MapExtent::new(0.0, 0.0, 4000.0, 3000.0);
        let view = SyntheticMapView::new(start, 800, 600);
        view.set_overlay("export-indicator", true).await;

        capture_map(
            &view,
            &area(MapExtent::new(100.0, 100.0, 900.0, 700.0)),
            100,
            100,
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(view.current_extent().await, start);
        assert!(view.overlay_visible("export-indicator").await);
    }

    #[tokio::test]
    async fn view_state_restored_after_failure() {
        let start = MapExtent::new(0.0, 0.0, 4000.0, 3000.0);
        let view = SyntheticMapView::new(start, 800, 600);
        view.fail_next_capture().await;

        let result = capture_map(
            &view,
            &area(MapExtent::new(100.0, 100.0, 900.0, 700.0)),
            100,
            100,
            &fast_options(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(view.current_extent().await, start);
    }

    #[tokio::test]
    async fn settle_timeout_is_not_fatal() {
        let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 4000.0, 3000.0), 800, 600);
        view.set_busy_forever(true).await;

        let img = capture_map(
            &view,
            &area(MapExtent::new(100.0, 100.0, 900.0, 700.0)),
            64,
            48,
            &fast_options(),
        )
        .await
        .unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[tokio::test]
    async fn empty_area_is_capture_unavailable() {
        let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 100.0, 100.0), 800, 600);
        let result = capture_map(
            &view,
            &area(MapExtent::new(50.0, 50.0, 50.0, 50.0)),
            100,
            100,
            &fast_options(),
        )
        .await;
        assert!(matches!(result, Err(CartaError::CaptureUnavailable(_))));
    }

    #[tokio::test]
    async fn projected_rect_preserves_aspect_ratio() {
        // viewport 800x600 over a 4000x3000 world: 1 px per 5 ground units
        // both axes, so a 2000x1000 window projects to 400x200 — the same
        // 2:1 ratio the output requests.
        let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 4000.0, 3000.0), 800, 600);
        let img = capture_map(
            &view,
            &area(MapExtent::new(0.0, 0.0, 2000.0, 1000.0)),
            800,
            400,
            &fast_options(),
        )
        .await
        .unwrap();
        let (last_w, last_h) = view.last_capture_rect().await.unwrap();
        let rect_ratio = last_w / last_h;
        let out_ratio = img.width() as f64 / img.height() as f64;
        assert!(
            (rect_ratio - out_ratio).abs() < 0.01,
            "rect {rect_ratio} vs out {out_ratio}"
        );
    }
}
