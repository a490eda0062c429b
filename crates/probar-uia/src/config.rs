//! Automation configuration.
//!
//! Everything has a working default; a YAML file only needs the keys it
//! overrides:
//!
//! ```yaml
//! registry:
//!   base_group: AutomationElementIdentifiers
//! search:
//!   timeout_ms: 2000
//!   min_searches: 1
//!   scope: descendants
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::{UiaError, UiaResult};
use crate::search::TreeScope;

/// Half-open range of provider ids, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    /// First id swept
    pub start: i32,
    /// One past the last id swept
    pub end: i32,
}

impl IdRange {
    /// Create a range
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Ids in the range
    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.start..self.end
    }

    /// Whether the range is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Where the capability registry looks for identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Pattern id range
    pub pattern_ids: IdRange,
    /// Property id range
    pub property_ids: IdRange,
    /// Owner name of the properties every element has
    pub base_group: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            pattern_ids: IdRange::new(10000, 11000),
            property_ids: IdRange::new(30000, 31000),
            base_group: "AutomationElementIdentifiers".to_string(),
        }
    }
}

/// Defaults for find operations that do not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// Overall timeout in milliseconds; `None` waits forever
    pub timeout_ms: Option<u64>,
    /// Polls performed even when the timeout has already expired
    pub min_searches: u32,
    /// Search scope relative to the starting element
    pub scope: TreeScope,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: Some(0),
            min_searches: 1,
            scope: TreeScope::Descendants,
        }
    }
}

impl SearchDefaults {
    /// Timeout as a duration; `None` means no deadline
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Capability discovery
    pub registry: RegistryConfig,
    /// Find defaults
    pub search: SearchDefaults,
}

impl AutomationConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the result fails validation
    pub fn from_yaml_str(yaml: &str) -> UiaResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> UiaResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> UiaResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the default find timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.search.timeout_ms =
            timeout.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the default minimum number of polls
    #[must_use]
    pub const fn with_min_searches(mut self, min_searches: u32) -> Self {
        self.search.min_searches = min_searches;
        self
    }

    /// Set the default search scope
    #[must_use]
    pub const fn with_scope(mut self, scope: TreeScope) -> Self {
        self.search.scope = scope;
        self
    }

    /// Set the base group owner name
    #[must_use]
    pub fn with_base_group(mut self, base_group: impl Into<String>) -> Self {
        self.registry.base_group = base_group.into();
        self
    }

    /// Check the configuration for values that cannot work
    ///
    /// # Errors
    ///
    /// Returns [`UiaError::Config`] describing the first problem found
    pub fn validate(&self) -> UiaResult<()> {
        if self.registry.pattern_ids.is_empty() {
            return Err(UiaError::config("registry.pattern_ids is empty"));
        }
        if self.registry.property_ids.is_empty() {
            return Err(UiaError::config("registry.property_ids is empty"));
        }
        if self.registry.base_group.trim().is_empty() {
            return Err(UiaError::config("registry.base_group must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AutomationConfig::default();
        assert_eq!(config.registry.pattern_ids, IdRange::new(10000, 11000));
        assert_eq!(config.registry.property_ids, IdRange::new(30000, 31000));
        assert_eq!(config.registry.base_group, "AutomationElementIdentifiers");
        assert_eq!(config.search.timeout(), Some(Duration::ZERO));
        assert_eq!(config.search.min_searches, 1);
        assert_eq!(config.search.scope, TreeScope::Descendants);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_id_range() {
        let range = IdRange::new(3, 6);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert!(!range.is_empty());
        assert!(IdRange::new(5, 5).is_empty());
    }

    #[test]
    fn test_builders() {
        let config = AutomationConfig::new()
            .with_timeout(Some(Duration::from_secs(2)))
            .with_min_searches(3)
            .with_scope(TreeScope::Children)
            .with_base_group("Base");
        assert_eq!(config.search.timeout_ms, Some(2000));
        assert_eq!(config.search.min_searches, 3);
        assert_eq!(config.search.scope, TreeScope::Children);
        assert_eq!(config.registry.base_group, "Base");
        assert_eq!(AutomationConfig::new().with_timeout(None).search.timeout(), None);
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = AutomationConfig::from_yaml_str(
                "search:\n  timeout_ms: 1500\n  scope: subtree\n",
            )
            .unwrap();
            assert_eq!(config.search.timeout_ms, Some(1500));
            assert_eq!(config.search.scope, TreeScope::Subtree);
            assert_eq!(config.search.min_searches, 1);
            assert_eq!(config.registry, RegistryConfig::default());
        }

        #[test]
        fn test_null_timeout_means_forever() {
            let config = AutomationConfig::from_yaml_str("search:\n  timeout_ms: null\n").unwrap();
            assert_eq!(config.search.timeout(), None);
        }

        #[test]
        fn test_empty_range_is_rejected() {
            let err = AutomationConfig::from_yaml_str(
                "registry:\n  pattern_ids:\n    start: 10\n    end: 10\n",
            )
            .unwrap_err();
            assert!(matches!(err, UiaError::Config { .. }));
        }

        #[test]
        fn test_malformed_yaml() {
            let err = AutomationConfig::from_yaml_str("search: [").unwrap_err();
            assert!(matches!(err, UiaError::Yaml(_)));
        }

        #[test]
        fn test_round_trip() {
            let config = AutomationConfig::new().with_min_searches(4);
            let yaml = config.to_yaml().unwrap();
            assert_eq!(AutomationConfig::from_yaml_str(&yaml).unwrap(), config);
        }

        #[test]
        fn test_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "registry:\n  base_group: CustomBase").unwrap();
            let config = AutomationConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.registry.base_group, "CustomBase");
        }

        #[test]
        fn test_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = AutomationConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
            assert!(matches!(err, UiaError::Io(_)));
        }
    }
}
