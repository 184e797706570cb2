//! Configuration for mock registries and spy trackers.

/// Controls how auto-mocks are synthesized and how spies behave.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Keep non-function data exports as-is when auto-mocking.
    /// Default: true.
    pub preserve_data_exports: bool,

    /// Spies delegate to the original implementation until a replacement
    /// is installed. Default: true.
    pub spies_call_through: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            preserve_data_exports: true,
            spies_call_through: true,
        }
    }
}

impl RegistryConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-mocks replace data exports with undefined instead of
    /// carrying them over.
    pub fn bare_auto_mocks() -> Self {
        Self {
            preserve_data_exports: false,
            ..Self::default()
        }
    }

    /// Spies record calls without delegating to the original.
    pub fn detached_spies() -> Self {
        Self {
            spies_call_through: false,
            ..Self::default()
        }
    }
}
