//! Analyzer configuration.
//!
//! Configuration is optional: every field has a default, and a YAML file only
//! needs the keys it overrides.
//!
//! ```yaml
//! cache:
//!   max-entries: 64
//! budget:
//!   parse-timeout-ms: 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of cached documents.
pub const DEFAULT_CACHE_ENTRIES: usize = 256;

/// Default total source bytes held by the cache (256 MiB).
pub const DEFAULT_CACHE_BYTES: usize = 256 * 1024 * 1024;

/// Default largest source parsed in full (8 MiB).
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 8 * 1024 * 1024;

/// Default parse timeout in milliseconds.
pub const DEFAULT_PARSE_TIMEOUT_MS: u64 = 5_000;

/// Default deepest syntax tree level kept.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 1_024;

/// Largest accepted `max-tree-depth`.
///
/// Symbol nesting follows tree depth, and serializing or rendering nested
/// symbols recurses once per level.
pub const MAX_TREE_DEPTH_LIMIT: usize = 4_096;

/// Default largest syntax tree kept, in nodes.
pub const DEFAULT_MAX_NODES: usize = 2_000_000;

/// Default most symbols extracted per document.
pub const DEFAULT_MAX_SYMBOLS: usize = 50_000;

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalyzerConfig {
    /// Parse cache sizing
    pub cache: CacheConfig,

    /// Per-document resource limits
    pub budget: Budget,
}

/// Parse cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Most documents held at once
    pub max_entries: usize,

    /// Most source bytes held at once
    pub max_source_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_ENTRIES,
            max_source_bytes: DEFAULT_CACHE_BYTES,
        }
    }
}

/// Resource limits applied to one parse.
///
/// Exceeding a limit never fails a request; results come back partial and
/// carry a [`crate::Truncation`] marker instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Budget {
    /// Source beyond this many bytes is not parsed
    pub max_source_bytes: usize,

    /// Parser timeout in milliseconds (0 disables the timeout)
    pub parse_timeout_ms: u64,

    /// Syntax tree levels kept below the root
    pub max_tree_depth: usize,

    /// Syntax tree nodes kept
    pub max_nodes: usize,

    /// Symbols extracted
    pub max_symbols: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            parse_timeout_ms: DEFAULT_PARSE_TIMEOUT_MS,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_symbols: DEFAULT_MAX_SYMBOLS,
        }
    }
}

impl Budget {
    /// The parse timeout as a `Duration`, or `None` when disabled.
    #[must_use]
    pub fn parse_timeout(&self) -> Option<Duration> {
        (self.parse_timeout_ms > 0).then(|| Duration::from_millis(self.parse_timeout_ms))
    }
}

impl AnalyzerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if it
    /// does not parse or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on malformed YAML or invalid values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if the
    /// file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the values describe a usable analyzer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first invalid key.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            return Err(Error::Config(
                "cache.max-entries must be at least 1".to_string(),
            ));
        }
        if self.budget.max_tree_depth == 0 {
            return Err(Error::Config(
                "budget.max-tree-depth must be at least 1".to_string(),
            ));
        }
        if self.budget.max_tree_depth > MAX_TREE_DEPTH_LIMIT {
            return Err(Error::Config(format!(
                "budget.max-tree-depth must be at most {MAX_TREE_DEPTH_LIMIT}"
            )));
        }
        if self.budget.max_nodes == 0 {
            return Err(Error::Config(
                "budget.max-nodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AnalyzerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_ENTRIES);
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = AnalyzerConfig::from_yaml(
            "cache:\n  max-entries: 8\nbudget:\n  parse-timeout-ms: 0\n",
        )
        .unwrap();

        assert_eq!(config.cache.max_entries, 8);
        assert_eq!(config.cache.max_source_bytes, DEFAULT_CACHE_BYTES);
        assert_eq!(config.budget.parse_timeout(), None);
        assert_eq!(config.budget.max_symbols, DEFAULT_MAX_SYMBOLS);
    }

    #[test]
    fn zero_cache_entries_is_rejected() {
        let err = AnalyzerConfig::from_yaml("cache:\n  max-entries: 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("max-entries")));
    }

    #[test]
    fn tree_depth_above_the_limit_is_rejected() {
        let yaml = format!("budget:\n  max-tree-depth: {}\n", MAX_TREE_DEPTH_LIMIT + 1);
        let err = AnalyzerConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("max-tree-depth")));

        let yaml = format!("budget:\n  max-tree-depth: {MAX_TREE_DEPTH_LIMIT}\n");
        let config = AnalyzerConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.budget.max_tree_depth, MAX_TREE_DEPTH_LIMIT);
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let err = AnalyzerConfig::from_yaml("cache: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arbor.yaml");
        let mut config = AnalyzerConfig::default();
        config.budget.max_nodes = 1234;

        config.save(&path).unwrap();
        let loaded = AnalyzerConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = AnalyzerConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
