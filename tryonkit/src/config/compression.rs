//! Upload compression configuration.

/// Longest image side after downscaling, in pixels.
const DEFAULT_MAX_DIMENSION: u32 = 1500;

/// JPEG quality for the re-encoded upload.
const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Configuration for preparing a source photo for upload.
///
/// The photo is decoded, downscaled so its longest side does not exceed
/// `max_dimension`, and re-encoded as JPEG. This runs on a blocking
/// worker, never on the notification or UI contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl CompressionConfig {
    /// Creates a compression configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum image dimension. Default: 1500 pixels.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Sets the JPEG quality (1-100). Default: 85.
    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality.clamp(1, 100);
        self
    }

    /// Longest allowed image side in pixels.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// JPEG encoding quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompressionConfig::default();
        assert_eq!(config.max_dimension(), 1500);
        assert_eq!(config.jpeg_quality(), 85);
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(CompressionConfig::new().with_jpeg_quality(0).jpeg_quality(), 1);
        assert_eq!(
            CompressionConfig::new().with_jpeg_quality(255).jpeg_quality(),
            100
        );
    }
}
