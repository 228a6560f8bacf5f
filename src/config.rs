//! Configuration for AtlasTree
//!
//! Centralized tree configuration with sensible defaults.

use crate::error::{AtlasError, Result};

/// Largest fan-out the wire format can describe (`itemCount` is a `u8`)
pub const MAX_ITEMS_LIMIT: usize = u8::MAX as usize;

/// Smallest fan-out that still leaves room to split and merge
pub const MIN_ITEMS_LIMIT: usize = 3;

/// Tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Node Configuration
    // -------------------------------------------------------------------------
    /// Maximum items per node before it splits
    max_items: usize,

    // -------------------------------------------------------------------------
    // Load Configuration
    // -------------------------------------------------------------------------
    /// Run a full structural check after decoding a stream
    verify_on_load: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS_LIMIT,
            verify_on_load: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Maximum items a node may hold between operations
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Minimum items every non-root node keeps after rebalancing (40% of
    /// `max_items`, at least one)
    pub fn min_items(&self) -> usize {
        (self.max_items * 40 / 100).max(1)
    }

    pub fn verify_on_load(&self) -> bool {
        self.verify_on_load
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the node fan-out (3..=255)
    pub fn max_items(mut self, count: usize) -> Self {
        self.config.max_items = count;
        self
    }

    /// Verify every structural invariant after `load`
    pub fn verify_on_load(mut self, enabled: bool) -> Self {
        self.config.verify_on_load = enabled;
        self
    }

    pub fn build(self) -> Result<Config> {
        let max_items = self.config.max_items;
        if !(MIN_ITEMS_LIMIT..=MAX_ITEMS_LIMIT).contains(&max_items) {
            return Err(AtlasError::Config(format!(
                "max_items must be within {}..={}, got {}",
                MIN_ITEMS_LIMIT, MAX_ITEMS_LIMIT, max_items
            )));
        }
        Ok(self.config)
    }
}
