use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use tracing::debug;

use crate::config::ImageConfig;
use crate::error::DecodeError;

pub const JPEG_MIME: &str = "image/jpeg";

/// A photo shrunk and re-encoded for upload to the model.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
    /// Base64 payload without any `data:` prefix.
    pub base64: String,
}

impl NormalizedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Target size after bounding the longest edge to `max_edge`; never upscales.
pub fn scaled_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(longest);
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.clamp(1, max_edge), h.clamp(1, max_edge))
}

pub fn normalize_image(bytes: &[u8], cfg: &ImageConfig) -> Result<NormalizedImage, DecodeError> {
    let img = image::load_from_memory(bytes).map_err(DecodeError::Unreadable)?;
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(DecodeError::EmptySurface {
            width: src_w,
            height: src_h,
        });
    }

    let (width, height) = scaled_dimensions(src_w, src_h, cfg.max_edge);
    let img = if (width, height) == (src_w, src_h) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, cfg.jpeg_quality))
        .map_err(DecodeError::Encode)?;

    debug!(
        src_w,
        src_h,
        width,
        height,
        in_bytes = bytes.len(),
        out_bytes = jpeg.len(),
        "image normalized"
    );

    Ok(NormalizedImage {
        width,
        height,
        mime_type: JPEG_MIME,
        base64: STANDARD.encode(&jpeg),
    })
}
