//! # Carta - Map Sheet Composition Library
//!
//! Carta composes a printable map sheet from a live map view and a
//! reusable page template, then rasterizes it into a downloadable file.
//! It provides:
//!
//! - **Templates**: percentage-based page layouts, JSON round-trippable
//! - **Capture**: pixel-exact extent capture through a map-view capability
//! - **Legend layout**: column/size search with measured label fitting
//! - **Renderers**: scale bar, north arrow, legend, text, images
//! - **Export**: PDF, PNG, and JPEG encoding
//!
//! ## Quick Start
//!
//! ```no_run
//! use carta::capture::SyntheticMapView;
//! use carta::compose::{Compositor, ExportOptions};
//! use carta::context::ExportContext;
//! use carta::export::{self, ExportFormat};
//! use carta::geo::MapExtent;
//! use carta::template::Template;
//!
//! # async fn run() -> Result<(), carta::CartaError> {
//! let template = Template::letter_landscape_default();
//! let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 8000.0, 6000.0), 1024, 768);
//! let ctx = ExportContext::new();
//!
//! let compositor = Compositor::new(&view, &ctx, ExportOptions::default());
//! let output = compositor.render(&template, &[]).await?;
//! let bytes = export::encode(&output, ExportFormat::Pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Page template data model |
//! | [`geo`] | Map extents, export areas, screen geometry |
//! | [`scale`] | Ground scale to export area resolution |
//! | [`capture`] | Map-view capability and capture protocol |
//! | [`legend`] | Legend items and the column layout engine |
//! | [`render`] | Drawing surface and element renderers |
//! | [`compose`] | The compositor |
//! | [`export`] | File encoding |
//! | [`context`] | Caller-owned shared services |
//! | [`error`] | Error types |
//!
//! ## Concurrency Model
//!
//! One export is one sequential async operation. The map view is the only
//! shared mutable resource; capture saves its state and restores it on
//! every exit path. Callers must not run two exports against the same
//! view concurrently.

pub mod capture;
pub mod compose;
pub mod context;
pub mod error;
pub mod export;
pub mod geo;
pub mod legend;
pub mod render;
pub mod scale;
pub mod template;

// Re-exports for convenience
pub use capture::MapView;
pub use compose::{Compositor, ExportOptions, ExportOutput};
pub use context::ExportContext;
pub use error::CartaError;
pub use export::ExportFormat;
pub use template::Template;
