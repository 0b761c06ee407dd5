//! An offline map view over a procedural graticule.
//!
//! Renders a deterministic world (checkerboard ground tint with grid
//! lines on round coordinates) so the full export pipeline can run in
//! tests and the CLI without a live map service. Pixel values are a pure
//! function of world coordinates, which makes capture idempotent and
//! aspect properties checkable.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tokio::sync::Mutex;

use super::MapView;
use crate::error::CartaError;
use crate::geo::{MapExtent, MapPoint, ScreenPoint, ScreenRect};

/// Ground spacing of the minor grid lines.
const GRID_SPACING: f64 = 500.0;
/// Ground spacing of the checkerboard tint.
const CHECKER_SPACING: f64 = 1000.0;

#[derive(Debug)]
struct ViewState {
    extent: MapExtent,
    hidden_overlays: Vec<String>,
    visible_overlays: Vec<String>,
    busy_forever: bool,
    busy_polls_remaining: u32,
    fail_next_capture: bool,
    capture_count: usize,
    last_capture_rect: Option<(f64, f64)>,
}

/// A deterministic, in-memory [`MapView`].
pub struct SyntheticMapView {
    viewport_width: u32,
    viewport_height: u32,
    state: Mutex<ViewState>,
}

impl SyntheticMapView {
    pub fn new(extent: MapExtent, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            state: Mutex::new(ViewState {
                extent,
                hidden_overlays: Vec::new(),
                visible_overlays: Vec::new(),
                busy_forever: false,
                busy_polls_remaining: 0,
                fail_next_capture: false,
                capture_count: 0,
                last_capture_rect: None,
            }),
        }
    }

    /// Register an overlay and its starting visibility.
    pub async fn set_overlay(&self, id: &str, visible: bool) {
        let mut s = self.state.lock().await;
        s.hidden_overlays.retain(|o| o != id);
        s.visible_overlays.retain(|o| o != id);
        if visible {
            s.visible_overlays.push(id.to_string());
        } else {
            s.hidden_overlays.push(id.to_string());
        }
    }

    pub async fn overlay_visible(&self, id: &str) -> bool {
        self.state.lock().await.visible_overlays.iter().any(|o| o == id)
    }

    /// Make `is_busy` report busy until the settle timeout trips.
    pub async fn set_busy_forever(&self, busy: bool) {
        self.state.lock().await.busy_forever = busy;
    }

    /// Report busy for the next `polls` busy checks, then settle.
    pub async fn set_busy_polls(&self, polls: u32) {
        self.state.lock().await.busy_polls_remaining = polls;
    }

    /// Make the next `capture_region` call fail.
    pub async fn fail_next_capture(&self) {
        self.state.lock().await.fail_next_capture = true;
    }

    pub async fn capture_count(&self) -> usize {
        self.state.lock().await.capture_count
    }

    /// Width/height of the most recent capture rectangle, in screen pixels.
    pub async fn last_capture_rect(&self) -> Option<(f64, f64)> {
        self.state.lock().await.last_capture_rect
    }

    fn world_to_screen(&self, extent: &MapExtent, p: MapPoint) -> ScreenPoint {
        ScreenPoint {
            x: (p.x - extent.xmin) / extent.width() * self.viewport_width as f64,
            y: (extent.ymax - p.y) / extent.height() * self.viewport_height as f64,
        }
    }

    fn screen_to_world(&self, extent: &MapExtent, x: f64, y: f64) -> MapPoint {
        MapPoint::new(
            extent.xmin + x / self.viewport_width as f64 * extent.width(),
            extent.ymax - y / self.viewport_height as f64 * extent.height(),
        )
    }
}

/// Ground color at a world coordinate: checkerboard tint with grid lines.
fn ground_color(p: MapPoint) -> Rgba<u8> {
    let near_line = |v: f64| {
        let d = (v / GRID_SPACING).fract().abs();
        d < 0.015 || d > 0.985
    };
    if near_line(p.x) || near_line(p.y) {
        return Rgba([90, 110, 90, 255]);
    }
    let cx = (p.x / CHECKER_SPACING).floor() as i64;
    let cy = (p.y / CHECKER_SPACING).floor() as i64;
    if (cx + cy).rem_euclid(2) == 0 {
        Rgba([228, 236, 222, 255])
    } else {
        Rgba([214, 226, 238, 255])
    }
}

#[async_trait]
impl MapView for SyntheticMapView {
    async fn current_extent(&self) -> MapExtent {
        self.state.lock().await.extent
    }

    async fn set_extent(&self, extent: MapExtent) {
        self.state.lock().await.extent = extent;
    }

    async fn project_to_screen(&self, point: MapPoint) -> ScreenPoint {
        let extent = self.state.lock().await.extent;
        self.world_to_screen(&extent, point)
    }

    async fn capture_region(
        &self,
        rect: ScreenRect,
        out_width: u32,
        out_height: u32,
    ) -> Result<RgbaImage, CartaError> {
        let extent = {
            let mut s = self.state.lock().await;
            if s.fail_next_capture {
                s.fail_next_capture = false;
                return Err(CartaError::CaptureUnavailable(
                    "synthetic capture failure".into(),
                ));
            }
            s.capture_count += 1;
            s.last_capture_rect = Some((rect.width, rect.height));
            s.extent
        };

        let mut img = RgbaImage::new(out_width, out_height);
        for (px, py, pixel) in img.enumerate_pixels_mut() {
            let sx = rect.x + (px as f64 + 0.5) / out_width as f64 * rect.width;
            let sy = rect.y + (py as f64 + 0.5) / out_height as f64 * rect.height;
            *pixel = ground_color(self.screen_to_world(&extent, sx, sy));
        }
        Ok(img)
    }

    async fn is_busy(&self) -> bool {
        let mut s = self.state.lock().await;
        if s.busy_forever {
            return true;
        }
        if s.busy_polls_remaining > 0 {
            s.busy_polls_remaining -= 1;
            return true;
        }
        false
    }

    async fn set_overlay_visible(&self, id: &str, visible: bool) {
        self.set_overlay(id, visible).await;
    }
}
