//! Image encoding: `DynamicImage` → JPEG bytes.
//!
//! JPEG is the output contract of both tools — the extractor ships the
//! bytes as standalone page images, the compressor embeds them as DCTDecode
//! streams. The quality knob is only exercised by the compressor; the
//! extractor keeps the encoder default.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Quality used when the caller does not specify one (the `image` crate's
/// own default).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encode a rasterised page as JPEG.
///
/// The image is flattened to RGB first: page bitmaps come out of pdfium as
/// RGBA, and JPEG has no alpha channel.
pub fn encode_jpeg(
    image: &DynamicImage,
    quality: Option<u8>,
) -> Result<Vec<u8>, image::ImageError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&rgb)?;

    debug!(
        "Encoded {}x{} page → {} JPEG bytes (q={})",
        rgb.width(),
        rgb.height(),
        buf.len(),
        quality
    );
    Ok(buf)
}
