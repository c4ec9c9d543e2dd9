//! History feature configuration.

/// Default namespace for persistence keys.
const DEFAULT_STORAGE_NAMESPACE: &str = "tryonkit";

/// Configuration for the history store.
///
/// The storage namespace isolates persisted history per SDK integration;
/// it is threaded into the persistence collaborator explicitly instead
/// of living in process-wide mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    uploads_enabled: bool,
    generations_enabled: bool,
    storage_namespace: String,
}

impl HistoryConfig {
    /// Creates a history configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the uploaded-photos history. Default: enabled.
    pub fn with_uploads_enabled(mut self, enabled: bool) -> Self {
        self.uploads_enabled = enabled;
        self
    }

    /// Enables or disables the generated-results history. Default:
    /// enabled.
    pub fn with_generations_enabled(mut self, enabled: bool) -> Self {
        self.generations_enabled = enabled;
        self
    }

    /// Sets the persistence key namespace.
    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    /// Whether uploaded photos are persisted.
    pub fn uploads_enabled(&self) -> bool {
        self.uploads_enabled
    }

    /// Whether generated results are persisted.
    pub fn generations_enabled(&self) -> bool {
        self.generations_enabled
    }

    /// Persistence key namespace for this integration.
    pub fn storage_namespace(&self) -> &str {
        &self.storage_namespace
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            uploads_enabled: true,
            generations_enabled: true,
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert!(config.uploads_enabled());
        assert!(config.generations_enabled());
        assert_eq!(config.storage_namespace(), "tryonkit");
    }

    #[test]
    fn test_builder_overrides() {
        let config = HistoryConfig::new()
            .with_uploads_enabled(false)
            .with_storage_namespace("acme-shop");
        assert!(!config.uploads_enabled());
        assert_eq!(config.storage_namespace(), "acme-shop");
    }
}
