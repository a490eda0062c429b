//! Automation entry point.
//!
//! [`Automation`] owns the oracle, the capability registry built from it, and
//! the clock used for polling. Every [`Element`] borrows from it.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::condition::{Condition, Filter};
use crate::config::AutomationConfig;
use crate::element::Element;
use crate::oracle::{KeyInjector, Oracle};
use crate::registry::CapabilityRegistry;
use crate::result::UiaResult;
use crate::search::FindOptions;

/// A connected accessibility session
pub struct Automation<O: Oracle> {
    oracle: O,
    registry: CapabilityRegistry,
    config: AutomationConfig,
    clock: Arc<dyn Clock>,
}

impl<O: Oracle> fmt::Debug for Automation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automation")
            .field("patterns", &self.registry.patterns().len())
            .field("properties", &self.registry.property_count())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<O: Oracle> Automation<O> {
    /// Connect with the default configuration
    ///
    /// # Errors
    ///
    /// Returns error if the capability registry cannot be built
    pub fn new(oracle: O) -> UiaResult<Self> {
        Self::with_config(oracle, AutomationConfig::default())
    }

    /// Connect with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the capability
    /// registry cannot be built
    pub fn with_config(oracle: O, config: AutomationConfig) -> UiaResult<Self> {
        config.validate()?;
        let registry = CapabilityRegistry::build(&oracle, &config.registry)?;
        info!(
            base_group = %config.registry.base_group,
            timeout_ms = ?config.search.timeout_ms,
            "automation ready"
        );
        Ok(Self {
            oracle,
            registry,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source used by searches and waits
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The oracle
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The capability registry
    #[must_use]
    pub const fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// The configuration in effect
    #[must_use]
    pub const fn config(&self) -> &AutomationConfig {
        &self.config
    }

    /// The time source
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Find options built from the configured defaults
    #[must_use]
    pub fn find_options(&self) -> FindOptions {
        FindOptions::from_defaults(&self.config.search)
    }

    /// Wrap an oracle node
    #[must_use]
    pub const fn element(&self, node: O::Node) -> Element<'_, O> {
        Element::new(self, node)
    }

    /// The root of the tree
    ///
    /// # Errors
    ///
    /// Returns error if the oracle cannot provide the root
    pub fn desktop(&self) -> UiaResult<Element<'_, O>> {
        Ok(self.element(self.oracle.root()?))
    }

    /// The element with keyboard focus
    ///
    /// # Errors
    ///
    /// Returns error if the oracle cannot provide the focused node
    pub fn focused(&self) -> UiaResult<Element<'_, O>> {
        Ok(self.element(self.oracle.focused()?))
    }

    /// Resolve a filter against this session's registry
    ///
    /// # Errors
    ///
    /// Returns error if a filter name does not resolve
    pub fn condition(&self, filter: impl Into<Filter>) -> UiaResult<Condition> {
        filter.into().build(&self.registry)
    }
}

impl<O: Oracle + KeyInjector> Automation<O> {
    /// Send keystrokes to the focused element
    ///
    /// # Errors
    ///
    /// Returns error if the oracle rejects the input
    pub fn send_keys(&self, keys: &str) -> UiaResult<()> {
        debug!(keys, "send_keys");
        Ok(self.oracle.send_keys(keys)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::Timeout;
    use crate::config::IdRange;
    use crate::mock::{ids, MockOracle};
    use crate::oracle::IdentifierInfo;
    use crate::result::{OracleError, UiaError};
    use crate::search::TreeScope;
    use std::time::Duration;

    #[test]
    fn test_new_builds_registry() {
        let automation = Automation::new(MockOracle::with_standard_catalog()).unwrap();
        assert!(automation.registry().pattern("Window").is_some());
        assert_eq!(automation.config(), &AutomationConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AutomationConfig::default();
        config.registry.property_ids = IdRange::new(1, 1);
        let err = Automation::with_config(MockOracle::new(), config).unwrap_err();
        assert!(matches!(err, UiaError::Config { .. }));
    }

    #[test]
    fn test_registry_failure_is_fatal() {
        let mut oracle = MockOracle::with_standard_catalog();
        oracle.add_property_info(IdentifierInfo::new(30_600, "Stray", "Nowhere.StrayProperty"));
        assert!(matches!(
            Automation::new(oracle),
            Err(UiaError::RegistryInconsistency { .. })
        ));
    }

    #[test]
    fn test_desktop_and_focused() {
        let oracle = MockOracle::with_standard_catalog();
        let edit = oracle.add_child(oracle.root_id(), "Edit");
        oracle.set_focused(edit);
        let automation = Automation::new(oracle).unwrap();
        assert_eq!(*automation.desktop().unwrap().node(), automation.oracle().root_id());
        assert_eq!(*automation.focused().unwrap().node(), edit);
    }

    #[test]
    fn test_focused_unavailable() {
        let oracle = MockOracle::with_standard_catalog();
        let edit = oracle.add_child(oracle.root_id(), "Edit");
        oracle.set_focused(edit);
        oracle.set_available(edit, false);
        let automation = Automation::new(oracle).unwrap();
        assert!(automation.focused().unwrap_err().is_unavailable());
    }

    #[test]
    fn test_find_options_follow_config() {
        let config = AutomationConfig::default()
            .with_timeout(Some(Duration::from_millis(750)))
            .with_scope(TreeScope::Children);
        let automation =
            Automation::with_config(MockOracle::with_standard_catalog(), config).unwrap();
        let options = automation.find_options();
        assert_eq!(options.timeout, Timeout::After(Duration::from_millis(750)));
        assert_eq!(options.scope, TreeScope::Children);
    }

    #[test]
    fn test_condition_uses_registry() {
        let automation = Automation::new(MockOracle::with_standard_catalog()).unwrap();
        let condition = automation
            .condition(Filter::new().with("class_name", "Button"))
            .unwrap();
        match condition {
            Condition::Property(leaf) => assert_eq!(leaf.property.id, ids::CLASS_NAME),
            other => panic!("expected leaf, got {other}"),
        }
    }

    #[test]
    fn test_send_keys() {
        let automation = Automation::new(MockOracle::new()).unwrap();
        automation.send_keys("{Alt}{F4}").unwrap();
        assert_eq!(automation.oracle().sent_keys(), vec!["{Alt}{F4}".to_string()]);
    }

    #[test]
    fn test_send_keys_failure() {
        let automation = Automation::new(MockOracle::new()).unwrap();
        automation
            .oracle()
            .fail_next("send_keys", OracleError::not_supported("send_keys"));
        assert!(matches!(
            automation.send_keys("x"),
            Err(UiaError::Oracle(OracleError::NotSupported { .. }))
        ));
    }

    #[test]
    fn test_debug_is_compact() {
        let automation = Automation::new(MockOracle::with_standard_catalog()).unwrap();
        let debug = format!("{automation:?}");
        assert!(debug.starts_with("Automation"));
        assert!(debug.contains("patterns: 7"));
    }
}
