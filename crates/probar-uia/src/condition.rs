//! Condition algebra for tree searches.
//!
//! A [`Condition`] is an immutable filter: constant true/false, a
//! property-equals leaf, or an AND/OR over sub-conditions. Conditions combine
//! with `&` / `|` (or [`and_`] / [`or_`]). AND flattens one level so
//! `(a & b) & c` and `a & (b & c)` are the same three-term AND; OR always
//! holds exactly its two operands, so `(a | b) | c` nests.
//!
//! The constants obey the usual identities:
//!
//! | expression  | result |
//! |-------------|--------|
//! | `c & True`  | `c`    |
//! | `c & False` | `False`|
//! | `c \| False`| `c`    |
//! | `c \| True` | `True` |
//!
//! # Example
//!
//! ```ignore
//! let close = Filter::new()
//!     .with("automation_id", "Close")
//!     .with("is_invoke", true)
//!     .build(automation.registry())?;
//! let either = Filter::new().with("value__is_read_only", true).build(registry)?
//!     | Filter::new().with("range_value__is_read_only", true).build(registry)?;
//! ```

use serde::Serialize;
use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::registry::{CapabilityRegistry, Property};
use crate::result::UiaResult;
use crate::value::PropertyValue;

/// Property-equals leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyCondition {
    /// Property to test
    pub property: Property,
    /// Value it must equal
    pub value: PropertyValue,
}

/// A boolean filter over element properties
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum Condition {
    /// Matches everything
    #[default]
    True,
    /// Matches nothing
    False,
    /// Matches when the property equals the value
    Property(PropertyCondition),
    /// Matches when every term matches
    And(Vec<Condition>),
    /// Matches when any term matches
    Or(Vec<Condition>),
}

impl Condition {
    /// Property-equals leaf
    #[must_use]
    pub fn property(property: &Property, value: impl Into<PropertyValue>) -> Self {
        Self::Property(PropertyCondition {
            property: property.clone(),
            value: value.into(),
        })
    }

    /// Build a condition from positional conditions and `name = value` filters.
    ///
    /// Everything is ANDed together; no input at all gives [`Condition::True`].
    /// Names follow [`CapabilityRegistry::resolve_property`]: `group__property`
    /// targets one group, a bare name takes the first group that defines it.
    ///
    /// # Errors
    ///
    /// Fails on the first filter name that does not resolve.
    pub fn build<C, K, V>(
        registry: &CapabilityRegistry,
        conditions: C,
        filters: impl IntoIterator<Item = (K, V)>,
    ) -> UiaResult<Self>
    where
        C: IntoIterator<Item = Self>,
        K: AsRef<str>,
        V: Into<PropertyValue>,
    {
        let mut terms: Vec<Self> = conditions.into_iter().collect();
        for (name, value) in filters {
            let property = registry.resolve_property(name.as_ref())?;
            terms.push(Self::property(property, value));
        }
        Ok(Self::all(terms))
    }

    /// AND of every condition; `True` when empty
    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = Self>) -> Self {
        conditions
            .into_iter()
            .reduce(Self::and)
            .unwrap_or(Self::True)
    }

    /// Left fold of `|` over every condition; `False` when empty
    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = Self>) -> Self {
        conditions
            .into_iter()
            .reduce(Self::or)
            .unwrap_or(Self::False)
    }

    /// Combine with AND
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, c) | (c, Self::True) => c,
            (a, b) => {
                let mut terms = a.into_and_terms();
                terms.extend(b.into_and_terms());
                Self::And(terms)
            }
        }
    }

    /// Combine with OR; the result holds the two operands as they are
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, c) | (c, Self::False) => c,
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    fn into_and_terms(self) -> Vec<Self> {
        match self {
            Self::And(terms) => terms,
            other => vec![other],
        }
    }

    /// Immediate sub-conditions (empty for leaves and constants)
    #[must_use]
    pub fn terms(&self) -> &[Self] {
        match self {
            Self::And(terms) | Self::Or(terms) => terms,
            _ => &[],
        }
    }

    /// Number of property leaves in the whole expression
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::True | Self::False => 0,
            Self::Property(_) => 1,
            Self::And(terms) | Self::Or(terms) => terms.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Evaluate against a property lookup.
    ///
    /// Providers that evaluate conditions themselves do not need this; it
    /// backs in-memory providers such as the mock.
    pub fn evaluate<F>(&self, lookup: &mut F) -> bool
    where
        F: FnMut(&Property) -> Option<PropertyValue>,
    {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Property(leaf) => lookup(&leaf.property).is_some_and(|v| v == leaf.value),
            Self::And(terms) => terms.iter().all(|t| t.evaluate(lookup)),
            Self::Or(terms) => terms.iter().any(|t| t.evaluate(lookup)),
        }
    }
}

impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

/// AND two conditions
#[must_use]
pub fn and_(a: Condition, b: Condition) -> Condition {
    a.and(b)
}

/// OR two conditions
#[must_use]
pub fn or_(a: Condition, b: Condition) -> Condition {
    a.or(b)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, terms: &[Condition], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{term}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::True => write!(f, "TRUE"),
            Self::False => write!(f, "FALSE"),
            Self::Property(leaf) => {
                write!(f, "{}.{} == {}", leaf.property.group, leaf.property.name, leaf.value)
            }
            Self::And(terms) => join(f, terms, "AND"),
            Self::Or(terms) => join(f, terms, "OR"),
        }
    }
}

/// Positional conditions plus `name = value` filters, resolved lazily.
///
/// This is what the find methods accept; it turns into a [`Condition`] once a
/// registry is at hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    properties: Vec<(String, PropertyValue)>,
}

impl Filter {
    /// Empty filter (matches everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional condition
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a `name = value` filter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Whether nothing has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.properties.is_empty()
    }

    /// Resolve against `registry`
    ///
    /// # Errors
    ///
    /// See [`Condition::build`].
    pub fn build(&self, registry: &CapabilityRegistry) -> UiaResult<Condition> {
        Condition::build(
            registry,
            self.conditions.iter().cloned(),
            self.properties.iter().map(|(k, v)| (k.as_str(), v.clone())),
        )
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Self::new().condition(condition)
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filter, (k, v)| filter.with(k, v))
    }
}
