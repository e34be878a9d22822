//! PNG QR codes for short links.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

/// Smallest edge of a rendered code, in pixels.
pub const QR_SIZE: u32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum QrRenderError {
    #[error("Content does not fit in a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Renders `content` as a PNG QR code with medium error correction.
pub fn render_png(content: &str) -> Result<Vec<u8>, QrRenderError> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
