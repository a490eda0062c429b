//! Capability registry: every pattern and property the provider can expose.
//!
//! Built once per [`Automation`](crate::Automation) by sweeping the provider's
//! pattern and property id ranges, then read-only.
//!
//! ## Grouping
//!
//! Each property is filed under the pattern that owns it, found by matching
//! the owner prefix of its programmatic name (`ValuePatternIdentifiers` in
//! `ValuePatternIdentifiers.IsReadOnlyProperty`) against the programmatic
//! names of the discovered patterns (`ValuePatternIdentifiers.Pattern`).
//! Properties owned by the universal base group go under that group. Property
//! names are unique within a group but not across groups: `IsReadOnly` exists
//! under both `Value` and `RangeValue`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::naming;
use crate::oracle::{IdentifierInfo, Oracle};
use crate::result::{UiaError, UiaResult};

/// Properties of one group, keyed by native property name
pub type PropertyGroup = BTreeMap<String, Property>;

/// A capability group an element may support
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    /// Provider id
    pub id: i32,
    /// Native name (e.g. `RangeValue`)
    pub name: String,
    /// Fully-qualified native name (e.g. `RangeValuePatternIdentifiers.Pattern`)
    pub programmatic_name: String,
}

impl From<IdentifierInfo> for Pattern {
    fn from(info: IdentifierInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            programmatic_name: info.programmatic_name,
        }
    }
}

/// A single readable attribute, owned by exactly one group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    /// Provider id
    pub id: i32,
    /// Native name (e.g. `IsReadOnly`)
    pub name: String,
    /// Fully-qualified native name
    pub programmatic_name: String,
    /// Owning group: a pattern name or the base group
    pub group: String,
}

impl Property {
    fn new(info: IdentifierInfo, group: impl Into<String>) -> Self {
        Self {
            id: info.id,
            name: info.name,
            programmatic_name: info.programmatic_name,
            group: group.into(),
        }
    }
}

/// Owner prefix of a programmatic name (`X` in `X.YProperty`)
fn owner_of(programmatic_name: &str) -> &str {
    programmatic_name
        .split_once('.')
        .map_or(programmatic_name, |(owner, _)| owner)
}

/// Catalog of patterns and properties discovered from the provider
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    patterns: BTreeMap<String, Pattern>,
    properties: BTreeMap<String, PropertyGroup>,
    base_group: String,
}

impl CapabilityRegistry {
    /// Sweep the configured id ranges and build the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`UiaError::RegistryInconsistency`] if a property belongs to
    /// neither a discovered pattern nor the base group.
    pub fn build<O: Oracle + ?Sized>(oracle: &O, config: &RegistryConfig) -> UiaResult<Self> {
        let mut patterns = BTreeMap::new();
        for id in config.pattern_ids.iter() {
            if let Some(info) = oracle.pattern_info(id) {
                patterns.insert(info.name.clone(), Pattern::from(info));
            }
        }

        let mut properties: BTreeMap<String, PropertyGroup> = BTreeMap::new();
        for id in config.property_ids.iter() {
            let Some(info) = oracle.property_info(id) else {
                continue;
            };
            let owner = owner_of(&info.programmatic_name);
            let pattern_programmatic = format!("{owner}.Pattern");
            let group = match patterns
                .values()
                .find(|p| p.programmatic_name == pattern_programmatic)
            {
                Some(pattern) => pattern.name.clone(),
                None if owner == config.base_group => config.base_group.clone(),
                None => {
                    return Err(UiaError::RegistryInconsistency {
                        property: info.programmatic_name.clone(),
                        owner: owner.to_string(),
                    })
                }
            };
            properties
                .entry(group.clone())
                .or_default()
                .insert(info.name.clone(), Property::new(info, group));
        }

        let mut registry = Self {
            patterns,
            properties,
            base_group: config.base_group.clone(),
        };
        registry.add_shortcuts();

        info!(
            patterns = registry.patterns.len(),
            groups = registry.properties.len(),
            properties = registry.property_count(),
            "capability registry built"
        );
        Ok(registry)
    }

    /// Register `<X>` next to every base-group `<X>PatternAvailable`
    fn add_shortcuts(&mut self) {
        let Some(base) = self.properties.get_mut(&self.base_group) else {
            return;
        };
        let shortcuts: Vec<(String, Property)> = base
            .iter()
            .filter_map(|(name, property)| {
                naming::shortcut_alias(name).map(|alias| (alias.to_string(), property.clone()))
            })
            .collect();
        for (alias, property) in shortcuts {
            debug!(alias = %alias, property = %property.name, "shortcut registered");
            base.insert(alias, property);
        }
    }

    /// All patterns, keyed by native name
    #[must_use]
    pub const fn patterns(&self) -> &BTreeMap<String, Pattern> {
        &self.patterns
    }

    /// All properties: group name -> native property name -> property
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, PropertyGroup> {
        &self.properties
    }

    /// Native name of the universal base group
    #[must_use]
    pub fn base_group(&self) -> &str {
        &self.base_group
    }

    /// Whether `group` is the universal base group
    #[must_use]
    pub fn is_base_group(&self, group: &str) -> bool {
        group == self.base_group
    }

    /// Look up a pattern by native name
    #[must_use]
    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    /// Properties of one group
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&PropertyGroup> {
        self.properties.get(name)
    }

    /// Number of registered property names, aliases included
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.values().map(BTreeMap::len).sum()
    }

    /// First property named `native_name` in registry iteration order.
    ///
    /// Which group wins when several define the name is not part of the
    /// contract; qualify the name with its group when it matters.
    #[must_use]
    pub fn find_property(&self, native_name: &str) -> Option<&Property> {
        self.properties
            .values()
            .find_map(|group| group.get(native_name))
    }

    /// Resolve a caller-supplied filter name to a property.
    ///
    /// `group__property` looks only inside `group`; a bare name takes the
    /// first match across all groups (see [`find_property`](Self::find_property)).
    ///
    /// # Errors
    ///
    /// [`UiaError::UnknownGroup`] or [`UiaError::UnresolvedProperty`], naming
    /// the offending identifier.
    pub fn resolve_property(&self, name: &str) -> UiaResult<&Property> {
        let unresolved = || UiaError::UnresolvedProperty {
            name: name.to_string(),
        };

        if let Some((group, property)) = naming::split_qualified(name) {
            let group_native = naming::native_name(group);
            let group_native = group_native.as_ref();
            if !self.patterns.contains_key(group_native) && !self.is_base_group(group_native) {
                return Err(UiaError::UnknownGroup {
                    name: group.to_string(),
                });
            }
            // Patterns that own no properties have no entry in `properties`
            return self
                .properties
                .get(group_native)
                .and_then(|properties| properties.get(naming::native_name(property).as_ref()))
                .ok_or_else(unresolved);
        }

        self.find_property(&naming::native_name(name))
            .ok_or_else(unresolved)
    }
}
