//! # Carta CLI
//!
//! Command-line interface for rendering map sheets offline.
//!
//! ## Usage
//!
//! ```bash
//! # Print the stock template JSON
//! carta template > sheet.json
//!
//! # Render a template against the built-in synthetic map
//! carta render --template sheet.json --out sheet.pdf
//!
//! # PNG at a fixed ground scale with a legend layer file
//! carta render --template sheet.json --layers layers.json \
//!     --scale 600 --format png --out sheet.png
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use carta::capture::SyntheticMapView;
use carta::compose::{Compositor, ExportOptions};
use carta::context::ExportContext;
use carta::error::CartaError;
use carta::export::{self, ExportFormat};
use carta::geo::MapExtent;
use carta::legend::LayerInfo;
use carta::template::{ElementKind, Template};

/// Carta - map sheet composition utility
#[derive(Parser, Debug)]
#[command(name = "carta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to a file using the built-in synthetic map view
    Render {
        /// Template JSON file (omit to use the stock landscape sheet)
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Legend layer description JSON (array of layers)
        #[arg(long, value_name = "FILE")]
        layers: Option<PathBuf>,

        /// Output file path (extension ignored; --format decides encoding)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output format: pdf, png, or jpeg
        #[arg(long, default_value = "pdf")]
        format: ExportFormatArg,

        /// Ground units per inch (omit for auto-fit to the view extent)
        #[arg(long)]
        scale: Option<f64>,

        /// Output resolution in DPI
        #[arg(long, default_value = "150")]
        dpi: f64,
    },

    /// Print the stock template JSON to stdout
    Template,
}

/// Thin parse wrapper so clap error messages name the valid formats.
#[derive(Debug, Clone, Copy)]
struct ExportFormatArg(ExportFormat);

impl std::str::FromStr for ExportFormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ExportFormatArg).map_err(|_| {
            format!("'{}' is not a format (expected pdf, png, or jpeg)", s)
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CartaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Template => {
            println!("{}", Template::letter_landscape_default().to_json());
            Ok(())
        }
        Commands::Render {
            template,
            layers,
            out,
            format,
            scale,
            dpi,
        } => {
            let template = match template {
                Some(path) => Template::from_json(&std::fs::read_to_string(path)?)?,
                None => Template::letter_landscape_default(),
            };
            let layers: Vec<LayerInfo> = match layers {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)
                    .map_err(|e| CartaError::InvalidTemplate(format!("layer JSON: {}", e)))?,
                None => Vec::new(),
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(render(template, layers, out, format.0, scale, dpi))
        }
    }
}

async fn render(
    template: Template,
    layers: Vec<LayerInfo>,
    out: Option<PathBuf>,
    format: ExportFormat,
    scale: Option<f64>,
    dpi: f64,
) -> Result<(), CartaError> {
    // A deterministic world roughly 2 miles across, viewed at 1024x768.
    let view = SyntheticMapView::new(MapExtent::new(0.0, 0.0, 10_000.0, 7_500.0), 1024, 768);
    let ctx = ExportContext::new();

    let options = ExportOptions {
        dpi,
        scale,
        ..ExportOptions::default()
    };
    let compositor = Compositor::new(&view, &ctx, options);
    let output = compositor.render(&template, &layers).await?;

    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }

    let bytes = export::encode(&output, format)?;
    let path = out.unwrap_or_else(|| {
        PathBuf::from(export::suggested_file_name(&sheet_title(&template), format))
    });
    std::fs::write(&path, &bytes)?;
    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// First title element's text, for the default output filename.
fn sheet_title(template: &Template) -> String {
    template
        .elements
        .iter()
        .find_map(|e| match &e.kind {
            ElementKind::Title { block } => Some(block.text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "map-export".into())
}
