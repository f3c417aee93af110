//! Driver configuration

use rdisk_props::Symbol;

/// Class name of the node whose properties get hooked
pub const DEFAULT_TARGET_CLASS: &str = "IOAHCIBlockStorageDriver";

/// Property that gets rewritten
pub const DEFAULT_HOOKED_KEY: &str = "Model";

/// Prefix added to the model string
pub const DEFAULT_PREFIX: &str = "APPLE SSD";

/// What to hook, where, and how
///
/// Fixed at construction; the driver never reloads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Class the locator searches the provider chain for
    pub target_class: String,
    /// Property key the rewriter is installed on
    pub hooked_key: Symbol,
    /// Prefix the rewriter adds
    pub prefix: String,
}

impl DriverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With target class
    #[inline]
    #[must_use]
    pub fn with_target_class(mut self, target_class: impl Into<String>) -> Self {
        self.target_class = target_class.into();
        self
    }

    /// With hooked key
    #[inline]
    #[must_use]
    pub fn with_hooked_key(mut self, key: impl Into<Symbol>) -> Self {
        self.hooked_key = key.into();
        self
    }

    /// With prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS.to_string(),
            hooked_key: Symbol::from(DEFAULT_HOOKED_KEY),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DriverConfig::new();
        assert_eq!(config.target_class, "IOAHCIBlockStorageDriver");
        assert_eq!(config.hooked_key.as_str(), "Model");
        assert_eq!(config.prefix, "APPLE SSD");
    }

    #[test]
    fn builders_override() {
        let config = DriverConfig::new()
            .with_target_class("IOSCSIPeripheralDeviceNub")
            .with_hooked_key("Product Name")
            .with_prefix("SAMSUNG");
        assert_eq!(config.target_class, "IOSCSIPeripheralDeviceNub");
        assert_eq!(config.hooked_key, Symbol::from("Product Name"));
        assert_eq!(config.prefix, "SAMSUNG");
    }
}
