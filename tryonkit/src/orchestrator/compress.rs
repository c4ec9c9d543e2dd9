//! Pre-upload image normalization.
//!
//! Person photos arrive from cameras and galleries at arbitrary sizes
//! and formats. Before upload they are decoded, downscaled so the longer
//! edge fits the configured bound, and re-encoded as JPEG. Decoding and
//! encoding are CPU-bound, so the work runs on the blocking pool.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::config::CompressionConfig;
use crate::source::FetchError;

/// Errors from [`prepare_upload_image`].
#[derive(Debug, Error)]
pub enum PrepareError {
    /// Reading the source bytes failed.
    #[error("failed to read source image")]
    Fetch(#[from] FetchError),

    /// The bytes were not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// JPEG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// The blocking task was cancelled or panicked.
    #[error("image preparation task did not complete")]
    TaskPanicked,
}

/// Decodes `raw`, scales it to fit `config.max_dimension()` on the longer
/// edge (never upscaling), and re-encodes it as JPEG at the configured
/// quality.
pub async fn prepare_upload_image(
    raw: Bytes,
    config: CompressionConfig,
) -> Result<Bytes, PrepareError> {
    tokio::task::spawn_blocking(move || encode_jpeg(raw, &config))
        .await
        .map_err(|_| PrepareError::TaskPanicked)?
}

fn encode_jpeg(raw: Bytes, config: &CompressionConfig) -> Result<Bytes, PrepareError> {
    let decoded = ImageReader::new(Cursor::new(raw.as_ref()))
        .with_guessed_format()
        .map_err(|e| PrepareError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| PrepareError::Decode(e.to_string()))?;

    let max = config.max_dimension();
    let (width, height) = (decoded.width(), decoded.height());
    let scaled = if width.max(height) > max {
        decoded.resize(max, max, image::imageops::FilterType::Triangle)
    } else {
        decoded
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, config.jpeg_quality());
    scaled
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| PrepareError::Encode(e.to_string()))?;

    debug!(
        input_bytes = raw.len(),
        output_bytes = out.len(),
        width = scaled.width(),
        height = scaled.height(),
        "prepared image for upload"
    );

    Ok(Bytes::from(out))
}
