//! Configuration types for TryOnKit components.
//!
//! Groups related parameters into builder-style objects with sensible
//! defaults, so components depend on one config struct instead of loose
//! parameters.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tryonkit::config::TryOnConfig;
//!
//! let config = TryOnConfig::default()
//!     .with_loader_ttl(Duration::from_secs(120));
//! assert_eq!(config.loader_ttl(), Duration::from_secs(120));
//! ```

mod compression;
mod history;
mod polling;

pub use compression::CompressionConfig;
pub use history::HistoryConfig;
pub use polling::PollConfig;

use std::time::Duration;

/// Default idle TTL for cached image loaders.
const DEFAULT_LOADER_TTL: Duration = Duration::from_secs(60);

/// Aggregate configuration for the try-on core.
#[derive(Debug, Clone, Default)]
pub struct TryOnConfig {
    polling: PollConfig,
    compression: CompressionConfig,
    loader_ttl: Option<Duration>,
}

impl TryOnConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polling configuration.
    pub fn with_polling(mut self, polling: PollConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Sets the upload compression configuration.
    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    /// Sets how long idle image loaders stay cached.
    pub fn with_loader_ttl(mut self, ttl: Duration) -> Self {
        self.loader_ttl = Some(ttl);
        self
    }

    /// Polling configuration for the generation status loop.
    pub fn polling(&self) -> &PollConfig {
        &self.polling
    }

    /// Upload compression configuration.
    pub fn compression(&self) -> &CompressionConfig {
        &self.compression
    }

    /// Idle TTL for cached image loaders. Default: 60 seconds.
    pub fn loader_ttl(&self) -> Duration {
        self.loader_ttl.unwrap_or(DEFAULT_LOADER_TTL)
    }
}
