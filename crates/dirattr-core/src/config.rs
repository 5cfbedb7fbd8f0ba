//! Configuration types for the dirattr core

use serde::{Deserialize, Serialize};

/// Limits applied to attribute names and values
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AttrLimits {
    /// Maximum length of a full attribute name, prefix included
    pub max_name_len: usize,
    /// Maximum length of a single attribute value
    pub max_value_len: usize,
}

impl Default for AttrLimits {
    fn default() -> Self {
        Self {
            max_name_len: 255,
            max_value_len: 64 * 1024,
        }
    }
}

/// Main configuration for the xattr emulation layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FsConfig {
    /// Reserved name of the hidden per-object attribute directory. The store
    /// must never expose this name through ordinary lookup or enumeration.
    pub attr_dir_name: String,
    pub limits: AttrLimits,
    /// Register the `trusted.` namespace (readable/writable by privileged
    /// callers only)
    pub enable_trusted: bool,
    /// Register the POSIX ACL attribute names for listing dispatch
    pub enable_acls: bool,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            attr_dir_name: ".xattr".to_string(),
            limits: AttrLimits::default(),
            enable_trusted: false,
            enable_acls: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = FsConfig::default();
        assert_eq!(config.attr_dir_name, ".xattr");
        assert!(config.limits.max_name_len >= 255);
        assert!(!config.enable_trusted);
    }

    #[test]
    fn round_trips_through_json() {
        let config = FsConfig {
            enable_trusted: true,
            ..FsConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: FsConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.attr_dir_name, config.attr_dir_name);
        assert!(back.enable_trusted);
    }
}
