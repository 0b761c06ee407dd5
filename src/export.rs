//! # Exporter
//!
//! Encodes a composited page surface to its final file format. PDF output
//! embeds the surface as a single full-page JPEG-compressed image sized to
//! the physical page; PNG and JPEG encode the surface directly at its
//! native pixel size.

use std::io::Cursor;

use image::DynamicImage;
use printpdf::image_crate::codecs::jpeg::JpegDecoder;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};

use crate::compose::ExportOutput;
use crate::error::CartaError;

/// JPEG quality for both direct JPEG output and the PDF-embedded raster.
/// High but lossy — tuned for print legibility versus file size.
const JPEG_QUALITY: u8 = 85;

const MM_PER_INCH: f64 = 25.4;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Pdf,
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Encode a composited sheet to file bytes.
pub fn encode(output: &ExportOutput, format: ExportFormat) -> Result<Vec<u8>, CartaError> {
    match format {
        ExportFormat::Pdf => encode_pdf(output),
        ExportFormat::Png => encode_png(output),
        ExportFormat::Jpeg => encode_jpeg(output),
    }
}

fn encode_png(output: &ExportOutput) -> Result<Vec<u8>, CartaError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut bytes));
    output
        .surface
        .write_with_encoder(encoder)
        .map_err(|e| CartaError::Encode(format!("PNG: {}", e)))?;
    Ok(bytes)
}

fn encode_jpeg(output: &ExportOutput) -> Result<Vec<u8>, CartaError> {
    jpeg_bytes(&output.surface)
}

fn jpeg_bytes(surface: &image::RgbaImage) -> Result<Vec<u8>, CartaError> {
    // JPEG carries no alpha; flatten first.
    let rgb = DynamicImage::ImageRgba8(surface.clone()).to_rgb8();
    let mut bytes = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CartaError::Encode(format!("JPEG: {}", e)))?;
    Ok(bytes)
}

/// One PDF page at the physical sheet dimensions, with the surface embedded
/// as a JPEG-compressed image filling the page. Orientation follows the
/// page's own width/height.
fn encode_pdf(output: &ExportOutput) -> Result<Vec<u8>, CartaError> {
    let width_mm = output.page_width_in * MM_PER_INCH;
    let height_mm = output.page_height_in * MM_PER_INCH;

    let (doc, page, layer) = PdfDocument::new(
        "Map Export",
        Mm(width_mm as f32),
        Mm(height_mm as f32),
        "Layer 1",
    );

    let jpeg = jpeg_bytes(&output.surface)?;
    let decoder = JpegDecoder::new(Cursor::new(&jpeg))
        .map_err(|e| CartaError::Encode(format!("PDF raster: {}", e)))?;
    let pdf_image =
        Image::try_from(decoder).map_err(|e| CartaError::Encode(format!("PDF raster: {}", e)))?;

    // Placed at the page origin; with the image DPI equal to the export
    // DPI, pixel dimensions map back to exactly the physical page.
    let transform = ImageTransform {
        translate_x: Some(Mm(0.0)),
        translate_y: Some(Mm(0.0)),
        rotate: None,
        scale_x: Some(1.0),
        scale_y: Some(1.0),
        dpi: Some(output.dpi as f32),
    };
    pdf_image.add_to_layer(doc.get_page(page).get_layer(layer), transform);

    let mut bytes = Vec::new();
    {
        let mut writer = std::io::BufWriter::new(&mut bytes);
        doc.save(&mut writer)
            .map_err(|e| CartaError::Encode(format!("PDF: {}", e)))?;
    }
    Ok(bytes)
}

/// Derive the output filename from the sheet title and a date.
pub fn export_file_name(title: &str, format: ExportFormat, date: chrono::NaiveDate) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug = "map-export".into();
    }
    format!(
        "{}-{}.{}",
        slug,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// [`export_file_name`] with today's local date.
pub fn suggested_file_name(title: &str, format: ExportFormat) -> String {
    export_file_name(title, format, chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::Canvas;
    use crate::render::color::Color;
    use chrono::NaiveDate;

    fn small_output() -> ExportOutput {
        ExportOutput {
            surface: Canvas::new(165, 128, Color::rgb(240, 240, 240)).into_image(),
            page_width_in: 11.0,
            page_height_in: 8.5,
            dpi: 15.0,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn png_bytes_have_signature() {
        let bytes = encode(&small_output(), ExportFormat::Png).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn jpeg_bytes_have_signature() {
        let bytes = encode(&small_output(), ExportFormat::Jpeg).unwrap();
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn pdf_bytes_have_header() {
        let bytes = encode(&small_output(), ExportFormat::Pdf).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn png_round_trips_pixel_dimensions() {
        let bytes = encode(&small_output(), ExportFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (165, 128));
    }

    #[test]
    fn file_name_slugifies_title() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            export_file_name("Flood Zones: North County", ExportFormat::Pdf, date),
            "flood-zones-north-county-2026-03-14.pdf"
        );
    }

    #[test]
    fn file_name_falls_back_when_title_is_symbols() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            export_file_name("***", ExportFormat::Png, date),
            "map-export-2026-03-14.png"
        );
    }

    #[test]
    fn format_parses_aliases() {
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("gif".parse::<ExportFormat>().is_err());
    }
}
