//! Export context — shared resources available to the compositor.
//!
//! Constructed once per export (or per application lifetime) by the caller
//! and passed through explicitly; there are no process-wide singletons.
//! The context owns the HTTP client used for image/logo elements, a shared
//! image cache, and the loaded font faces.

use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::RwLock;

use crate::error::CartaError;
use crate::render::text::TextRenderer;

/// Caller-owned services for one or more exports.
pub struct ExportContext {
    /// HTTP client for downloading image and logo elements.
    pub http_client: reqwest::Client,
    /// Downloaded images, keyed by URL.
    pub image_cache: Arc<RwLock<HashMap<String, DynamicImage>>>,
    /// Font faces for measurement and rasterization.
    pub fonts: TextRenderer,
}

impl ExportContext {
    /// A context with system fonts and an empty cache.
    pub fn new() -> Self {
        Self::with_fonts(TextRenderer::from_system())
    }

    /// A context with caller-supplied fonts (tests use
    /// [`TextRenderer::estimated`] for platform-independent measurement).
    pub fn with_fonts(fonts: TextRenderer) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .user_agent("carta/0.1")
                .build()
                .expect("failed to build HTTP client"),
            image_cache: Arc::new(RwLock::new(HashMap::new())),
            fonts,
        }
    }

    /// Fetch an image from a URL, using the cache when possible.
    pub async fn fetch_image(&self, url: &str) -> Result<DynamicImage, CartaError> {
        // Check cache
        {
            let cache = self.image_cache.read().await;
            if let Some(image) = cache.get(url) {
                return Ok(image.clone());
            }
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CartaError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CartaError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CartaError::Image(format!("Failed to read image data: {}", e)))?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| CartaError::Image(format!("Failed to decode image: {}", e)))?;

        {
            let mut cache = self.image_cache.write().await;
            cache.insert(url.to_string(), image.clone());
        }

        Ok(image)
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self::new()
    }
}
