//! Menu QR code generation

use qrcode::QrCode;
use qrcode::render::svg;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Rendered QR code
#[derive(Debug, Clone)]
pub struct QrImage {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub trait QrGenerator: Send + Sync {
    fn generate(&self, url: &str) -> Result<QrImage, BoxError>;
}

/// SVG renderer backed by the `qrcode` crate
pub struct SvgQrGenerator {
    min_size: u32,
}

impl SvgQrGenerator {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl Default for SvgQrGenerator {
    fn default() -> Self {
        Self::new(512)
    }
}

impl QrGenerator for SvgQrGenerator {
    fn generate(&self, url: &str) -> Result<QrImage, BoxError> {
        let code = QrCode::new(url.as_bytes()).map_err(|e| format!("QR encoding failed: {e}"))?;
        let image = code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.min_size, self.min_size)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();
        Ok(QrImage {
            content_type: "image/svg+xml",
            bytes: image.into_bytes(),
        })
    }
}
