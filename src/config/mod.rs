//! Build configuration registry
//!
//! Read-only key/value store for build defaults: the compiler to use and
//! the flag strings a build system carries (OPT, CFLAGS and friends).
//! Values here sit below the process environment; wherever both define a
//! key, the environment wins during merging.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Registry key for the base optimization flags
pub const KEY_OPT: &str = "OPT";

/// Registry key for general C compiler flags
pub const KEY_CFLAGS: &str = "CFLAGS";

/// Registry key for interpreter-build C flags
pub const KEY_PY_CFLAGS: &str = "PY_CFLAGS";

/// Registry key for interpreter-core C flags
pub const KEY_PY_CORE_CFLAGS: &str = "PY_CORE_CFLAGS";

/// Registry key for flags passed through configure
pub const KEY_CONFIGURE_CFLAGS: &str = "CONFIGURE_CFLAGS";

/// Registry key for the shared-object link command
pub const KEY_LDSHARED: &str = "LDSHARED";

/// Registry key for the C compiler command
pub const KEY_CC: &str = "CC";

/// Registry key for the C++ compiler command
pub const KEY_CXX: &str = "CXX";

/// Registry keys holding flag strings subject to override merging
pub const FLAG_KEYS: &[&str] = &[
    KEY_OPT,
    KEY_CFLAGS,
    KEY_PY_CFLAGS,
    KEY_PY_CORE_CFLAGS,
    KEY_CONFIGURE_CFLAGS,
    KEY_LDSHARED,
];

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// On-disk config format: a [vars] table of string values
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    vars: BTreeMap<String, String>,
}

/// Build configuration registry
///
/// There are no built-in values; an empty registry misses every lookup
/// and the pipeline runs on environment and defaults alone.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    vars: BTreeMap<String, String>,
}

impl BuildConfig {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        Ok(Self { vars: file.vars })
    }

    /// Build from explicit key/value pairs
    pub fn with_vars<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Look up a registry value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
