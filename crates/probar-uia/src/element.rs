//! Element proxy over one oracle node.
//!
//! An [`Element`] exposes every property and pattern member the registry
//! knows about, by name, without per-property code:
//!
//! ```ignore
//! let name: String = element.get("name")?;
//! let read_only: bool = element.get("value__is_read_only")?;
//! element.invoke("invoke", &[])?;
//! element.set("value", "42")?;
//! ```
//!
//! ## Resolution order
//!
//! 1. Supported properties (base group unfiltered, other groups intersected
//!    with what the oracle reports for this node)
//! 2. Members of supported pattern instances
//! 3. The oracle's own base attributes
//!
//! Anything else is [`UiaError::UnknownAttribute`]. Reads never run a pattern
//! method; only members the oracle marks as values are read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::automation::Automation;
use crate::clock::Timeout;
use crate::condition::{Condition, Filter};
use crate::naming;
use crate::oracle::{MemberKind, Oracle, PatternInstance};
use crate::registry::{Pattern, Property};
use crate::result::{UiaError, UiaResult};
use crate::search::{FindOptions, SearchEngine, SearchPolicy, TreeScope};
use crate::value::PropertyValue;

/// Supported properties of an element: group -> native name -> property
pub type SupportedProperties<'a> = BTreeMap<&'a str, BTreeMap<&'a str, &'a Property>>;

/// A live node in the accessibility tree
pub struct Element<'a, O: Oracle> {
    automation: &'a Automation<O>,
    node: O::Node,
}

impl<O: Oracle> Clone for Element<'_, O> {
    fn clone(&self) -> Self {
        Self {
            automation: self.automation,
            node: self.node.clone(),
        }
    }
}

impl<O: Oracle> fmt::Debug for Element<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element").field("node", &self.node).finish()
    }
}

/// Outcome of attribute resolution
#[derive(Debug)]
pub enum Attribute<'a> {
    /// A property value, already fetched
    Value(PropertyValue),
    /// A member of a pattern instance, bound to the element
    Member(BoundMember<'a>),
}

/// A pattern member bound to a live instance
pub struct BoundMember<'a> {
    pattern: &'a Pattern,
    name: String,
    kind: MemberKind,
    instance: Box<dyn PatternInstance + 'a>,
}

impl fmt::Debug for BoundMember<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMember")
            .field("pattern", &self.pattern.name)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<'a> BoundMember<'a> {
    /// Pattern that owns the member
    #[must_use]
    pub const fn pattern(&self) -> &'a Pattern {
        self.pattern
    }

    /// Native member name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the member is a method or a value
    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Call the member
    ///
    /// # Errors
    ///
    /// Whatever the oracle reports for the call
    pub fn call(&self, args: &[PropertyValue]) -> UiaResult<PropertyValue> {
        debug!(pattern = %self.pattern.name, member = %self.name, args = args.len(), "pattern call");
        Ok(self.instance.call(&self.name, args)?)
    }
}

impl<'a, O: Oracle> Element<'a, O> {
    pub(crate) const fn new(automation: &'a Automation<O>, node: O::Node) -> Self {
        Self { automation, node }
    }

    /// The underlying oracle node
    #[must_use]
    pub const fn node(&self) -> &O::Node {
        &self.node
    }

    /// Unwrap into the oracle node
    #[must_use]
    pub fn into_node(self) -> O::Node {
        self.node
    }

    /// The automation this element belongs to
    #[must_use]
    pub const fn automation(&self) -> &'a Automation<O> {
        self.automation
    }

    fn oracle(&self) -> &'a O {
        self.automation.oracle()
    }

    /// Properties this element supports, by group.
    ///
    /// The base group is always present in full; other groups are narrowed
    /// to what the oracle reports and dropped when nothing is left.
    ///
    /// # Errors
    ///
    /// Propagates oracle failures, including element unavailability.
    pub fn supported_properties(&self) -> UiaResult<SupportedProperties<'a>> {
        let registry = self.automation.registry();
        let reported: BTreeSet<i32> = self
            .oracle()
            .supported_properties(&self.node)?
            .into_iter()
            .collect();

        let mut supported = BTreeMap::new();
        for (group, properties) in registry.properties() {
            let base = registry.is_base_group(group);
            let selected: BTreeMap<&str, &Property> = properties
                .iter()
                .filter(|(_, property)| base || reported.contains(&property.id))
                .map(|(name, property)| (name.as_str(), property))
                .collect();
            if !selected.is_empty() {
                supported.insert(group.as_str(), selected);
            }
        }
        Ok(supported)
    }

    /// Patterns this element supports, by native name
    ///
    /// # Errors
    ///
    /// Propagates oracle failures, including element unavailability.
    pub fn supported_patterns(&self) -> UiaResult<BTreeMap<&'a str, &'a Pattern>> {
        let registry = self.automation.registry();
        let reported: BTreeSet<i32> = self
            .oracle()
            .supported_patterns(&self.node)?
            .into_iter()
            .collect();
        Ok(registry
            .patterns()
            .iter()
            .filter(|(name, pattern)| {
                !registry.is_base_group(name) && reported.contains(&pattern.id)
            })
            .map(|(name, pattern)| (name.as_str(), pattern))
            .collect())
    }

    /// Resolve `name` to a property value or a pattern member.
    ///
    /// # Errors
    ///
    /// [`UiaError::UnknownAttribute`] when nothing matches; oracle failures
    /// are propagated.
    pub fn resolve(&self, name: &str) -> UiaResult<Attribute<'a>> {
        let native = naming::native_name(name);
        let oracle = self.oracle();

        for properties in self.supported_properties()?.values() {
            if let Some(property) = properties.get(native.as_ref()) {
                let value = oracle.property_value(&self.node, property)?;
                trace!(name, group = %property.group, value = %value, "resolved property");
                return Ok(Attribute::Value(value));
            }
        }

        for pattern in self.supported_patterns()?.into_values() {
            let instance = oracle.pattern_instance(&self.node, pattern)?;
            if let Some(kind) = instance.member_kind(&native) {
                trace!(name, pattern = %pattern.name, ?kind, "resolved pattern member");
                return Ok(Attribute::Member(BoundMember {
                    pattern,
                    name: native.into_owned(),
                    kind,
                    instance,
                }));
            }
        }

        if let Some(value) = oracle.base_attribute(&self.node, &native)? {
            trace!(name, "resolved base attribute");
            return Ok(Attribute::Value(value));
        }

        Err(UiaError::UnknownAttribute {
            name: name.to_string(),
        })
    }

    /// Current value of `name`.
    ///
    /// Pattern-level value members are read with no arguments. Pattern
    /// methods are never run by a read.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); [`UiaError::NotReadable`] if `name`
    /// is a pattern method.
    pub fn value(&self, name: &str) -> UiaResult<PropertyValue> {
        match self.resolve(name)? {
            Attribute::Value(value) => Ok(value),
            Attribute::Member(member) => match member.kind() {
                MemberKind::Value => member.call(&[]),
                MemberKind::Method => Err(UiaError::NotReadable {
                    name: name.to_string(),
                }),
            },
        }
    }

    /// Typed value of `name`
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); also [`UiaError::ValueConversion`].
    pub fn get<T>(&self, name: &str) -> UiaResult<T>
    where
        T: TryFrom<PropertyValue, Error = UiaError>,
    {
        T::try_from(self.value(name)?)
    }

    /// The pattern member `name`, bound to this element
    ///
    /// # Errors
    ///
    /// [`UiaError::NotCallable`] if `name` is a property.
    pub fn member(&self, name: &str) -> UiaResult<BoundMember<'a>> {
        match self.resolve(name)? {
            Attribute::Member(member) => Ok(member),
            Attribute::Value(_) => Err(UiaError::NotCallable {
                name: name.to_string(),
            }),
        }
    }

    /// Call the pattern member `name`
    ///
    /// # Errors
    ///
    /// See [`member`](Self::member).
    pub fn invoke(&self, name: &str, args: &[PropertyValue]) -> UiaResult<PropertyValue> {
        self.member(name)?.call(args)
    }

    /// Assign `name` through its pattern setter (`Set<Name>`)
    ///
    /// # Errors
    ///
    /// [`UiaError::UnknownAttribute`] naming the setter if no supported
    /// pattern has one.
    pub fn set(&self, name: &str, value: impl Into<PropertyValue>) -> UiaResult<()> {
        let setter = format!("Set{}", naming::native_name(name));
        self.invoke(&setter, &[value.into()])?;
        Ok(())
    }

    /// Liveness probe that propagates unexpected failures.
    ///
    /// # Errors
    ///
    /// Oracle failures other than element unavailability.
    pub fn try_is_alive(&self) -> UiaResult<bool> {
        match self.oracle().process_id(&self.node) {
            Ok(_) => Ok(true),
            Err(err) if err.is_unavailable() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether the underlying UI still exists.
    ///
    /// Only an unavailability report counts as dead; other probe failures are
    /// logged and the element is assumed alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.try_is_alive().unwrap_or_else(|err| {
            warn!(error = %err, node = ?self.node, "liveness probe failed");
            true
        })
    }

    fn is_gone(&self, include_offscreen: bool) -> bool {
        if !self.is_alive() {
            return true;
        }
        if !include_offscreen {
            return false;
        }
        match self.oracle().is_offscreen(&self.node) {
            Ok(offscreen) => offscreen,
            Err(err) if err.is_unavailable() => true,
            Err(err) => {
                warn!(error = %err, node = ?self.node, "offscreen probe failed");
                false
            }
        }
    }

    /// Wait for the element to disappear.
    ///
    /// Polls liveness until the timeout passes; with `include_offscreen` an
    /// element reported off-screen counts as gone. Returns `true` once the
    /// element is gone, `false` if it was still there at the deadline.
    pub fn wait_unavailable(&self, timeout: impl Into<Timeout>, include_offscreen: bool) -> bool {
        let clock = self.automation.clock();
        let started = clock.now();
        let deadline = timeout.into().deadline_from(started);
        let mut polls: u32 = 0;
        loop {
            polls += 1;
            if self.is_gone(include_offscreen) {
                debug!(polls, node = ?self.node, "element unavailable");
                return true;
            }
            if !deadline.is_after(clock.now()) {
                debug!(polls, node = ?self.node, "element still available at deadline");
                return false;
            }
        }
    }

    /// Immediate parent via a raw tree walk; `None` at the root
    ///
    /// # Errors
    ///
    /// Propagates oracle failures, including element unavailability.
    pub fn parent(&self) -> UiaResult<Option<Self>> {
        Ok(self
            .oracle()
            .raw_parent(&self.node)?
            .map(|node| Self::new(self.automation, node)))
    }

    /// Immediate children, from a single search pass
    ///
    /// # Errors
    ///
    /// Propagates oracle failures, including element unavailability.
    pub fn children(&self) -> UiaResult<Vec<Self>> {
        let options = FindOptions::default()
            .timeout(Duration::ZERO)
            .min_searches(1)
            .scope(TreeScope::Children);
        self.find_many_with(Condition::True, &options)
    }

    /// First element under this one matching `filter`, or `None`.
    ///
    /// # Errors
    ///
    /// Filter names that do not resolve, and oracle failures.
    pub fn find_element(
        &self,
        filter: impl Into<Filter>,
        options: &FindOptions,
    ) -> UiaResult<Option<Self>> {
        let condition = filter.into().build(self.automation.registry())?;
        self.find_one_with(condition, options)
    }

    /// Elements under this one matching `filter`, from the last poll.
    ///
    /// # Errors
    ///
    /// Filter names that do not resolve, and oracle failures.
    pub fn find_elements(
        &self,
        filter: impl Into<Filter>,
        options: &FindOptions,
    ) -> UiaResult<Vec<Self>> {
        let condition = filter.into().build(self.automation.registry())?;
        self.find_many_with(condition, options)
    }

    /// [`find_element`](Self::find_element) with an already-built condition
    ///
    /// # Errors
    ///
    /// Oracle failures.
    pub fn find_one_with(
        &self,
        condition: Condition,
        options: &FindOptions,
    ) -> UiaResult<Option<Self>> {
        let engine = SearchEngine::new(self.oracle(), self.automation.clock());
        let policy = SearchPolicy::new(condition, options, self.automation.clock().now());
        Ok(engine
            .find_one(&self.node, &policy)?
            .map(|node| Self::new(self.automation, node)))
    }

    /// [`find_elements`](Self::find_elements) with an already-built condition
    ///
    /// # Errors
    ///
    /// Oracle failures.
    pub fn find_many_with(&self, condition: Condition, options: &FindOptions) -> UiaResult<Vec<Self>> {
        let engine = SearchEngine::new(self.oracle(), self.automation.clock());
        let policy = SearchPolicy::new(condition, options, self.automation.clock().now());
        Ok(engine
            .find_many(&self.node, &policy)?
            .into_iter()
            .map(|node| Self::new(self.automation, node))
            .collect())
    }
}
