//! Geographic and screen-space geometry.
//!
//! All map-side coordinates are in the view's projected coordinate system
//! (ground units, e.g. feet or meters). Screen-space values are in device
//! pixels with the origin at the top-left of the viewport.

use serde::{Deserialize, Serialize};

/// A point in the map's projected coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in projected map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapExtent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl MapExtent {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center(&self) -> MapPoint {
        MapPoint::new(
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// Build an extent of the given ground dimensions centered on a point.
    pub fn from_center(center: MapPoint, width: f64, height: f64) -> Self {
        Self {
            xmin: center.x - width / 2.0,
            ymin: center.y - height / 2.0,
            xmax: center.x + width / 2.0,
            ymax: center.y + height / 2.0,
        }
    }

    /// The four corners, clockwise from top-left (xmin, ymax).
    pub fn corners(&self) -> [MapPoint; 4] {
        [
            MapPoint::new(self.xmin, self.ymax),
            MapPoint::new(self.xmax, self.ymax),
            MapPoint::new(self.xmax, self.ymin),
            MapPoint::new(self.xmin, self.ymin),
        ]
    }
}

/// The geographic window that will be captured for the map element,
/// together with its ground scale (ground units per physical inch of
/// the printed map element).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportArea {
    pub extent: MapExtent,
    pub scale: f64,
}

impl ExportArea {
    /// The overlay geometry a UI draws while the operator positions the
    /// export window: a closed ring around the capture extent.
    pub fn indicator_geometry(&self) -> Geometry {
        let mut ring = self.extent.corners().to_vec();
        ring.push(ring[0]);
        Geometry::Polygon { ring }
    }
}

/// A point in viewport device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in viewport device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// Tight bounding rectangle of a set of screen points.
    pub fn bounding(points: &[ScreenPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// Geometry a view overlay can carry, with an explicit kind tag.
///
/// The tag is decided once at the ingestion boundary; nothing downstream
/// re-inspects coordinate arrays to guess what shape they describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Point(MapPoint),
    Polyline { path: Vec<MapPoint> },
    Polygon { ring: Vec<MapPoint> },
}

impl Geometry {
    /// Vertices of the geometry, in order.
    pub fn points(&self) -> &[MapPoint] {
        match self {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::Polyline { path } => path,
            Geometry::Polygon { ring } => ring,
        }
    }
}
