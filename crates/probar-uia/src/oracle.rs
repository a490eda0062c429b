//! The accessibility oracle seam.
//!
//! Everything this crate knows about the live UI comes through [`Oracle`].
//! Implementations wrap a platform accessibility provider; the crate ships a
//! scripted [`MockOracle`](crate::mock::MockOracle) for tests.
//!
//! ```text
//! ┌────────────┐    ┌──────────────┐    ┌───────────────────────┐
//! │ Element    │───►│ Oracle trait │───►│ Platform provider     │
//! │ Search     │    │ (blocking)   │    │ (UI Automation, ...)  │
//! └────────────┘    └──────────────┘    └───────────────────────┘
//! ```
//!
//! All calls are synchronous and may block for as long as the provider
//! takes. Any call on a node whose UI has gone away should fail with
//! [`OracleError::ElementUnavailable`](crate::OracleError::ElementUnavailable).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::Condition;
use crate::registry::{Pattern, Property};
use crate::result::OracleResult;
use crate::search::TreeScope;
use crate::value::PropertyValue;

/// Identifier metadata returned by the provider's id lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierInfo {
    /// Provider id
    pub id: i32,
    /// Short native name (`IsReadOnly`, `RangeValue`)
    pub name: String,
    /// Fully-qualified native name
    pub programmatic_name: String,
}

impl IdentifierInfo {
    /// Create identifier metadata
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>, programmatic_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            programmatic_name: programmatic_name.into(),
        }
    }
}

/// Blocking client interface to an accessibility tree provider
pub trait Oracle {
    /// Provider handle for one tree node
    type Node: Clone + fmt::Debug;

    /// Metadata for pattern `id`, if the provider defines it
    fn pattern_info(&self, id: i32) -> Option<IdentifierInfo>;

    /// Metadata for property `id`, if the provider defines it
    fn property_info(&self, id: i32) -> Option<IdentifierInfo>;

    /// Root of the tree (the desktop)
    fn root(&self) -> OracleResult<Self::Node>;

    /// Node that currently has keyboard focus
    fn focused(&self) -> OracleResult<Self::Node>;

    /// Immediate ancestor via a raw tree walk; `None` at the root
    fn raw_parent(&self, node: &Self::Node) -> OracleResult<Option<Self::Node>>;

    /// Ids of the properties the provider reports for `node`
    fn supported_properties(&self, node: &Self::Node) -> OracleResult<Vec<i32>>;

    /// Ids of the patterns the provider reports for `node`
    fn supported_patterns(&self, node: &Self::Node) -> OracleResult<Vec<i32>>;

    /// Current value of `property` on `node`
    fn property_value(&self, node: &Self::Node, property: &Property)
        -> OracleResult<PropertyValue>;

    /// Live instance of `pattern` on `node`
    fn pattern_instance<'a>(
        &'a self,
        node: &Self::Node,
        pattern: &Pattern,
    ) -> OracleResult<Box<dyn PatternInstance + 'a>>;

    /// First node within `scope` of `node` matching `condition`
    fn find_first(
        &self,
        node: &Self::Node,
        scope: TreeScope,
        condition: &Condition,
    ) -> OracleResult<Option<Self::Node>>;

    /// All nodes within `scope` of `node` matching `condition`
    fn find_all(
        &self,
        node: &Self::Node,
        scope: TreeScope,
        condition: &Condition,
    ) -> OracleResult<Vec<Self::Node>>;

    /// Owning process id; the liveness probe
    fn process_id(&self, node: &Self::Node) -> OracleResult<u32>;

    /// Whether the node is currently scrolled or hidden off-screen
    fn is_offscreen(&self, node: &Self::Node) -> OracleResult<bool>;

    /// Fields of the provider's own node representation that the registry does
    /// not cover (identity, structural data).
    fn base_attribute(
        &self,
        node: &Self::Node,
        native_name: &str,
    ) -> OracleResult<Option<PropertyValue>> {
        let _ = (node, native_name);
        Ok(None)
    }
}

/// What a pattern member is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// An action (`Invoke`, `Close`, `SetValue`); runs only when called
    Method,
    /// A pattern-level value (`DocumentRange`); read with no arguments
    Value,
}

/// A pattern bound to one node.
///
/// Members are addressed by native name and passed through as the provider
/// defines them: methods (`Invoke`, `SetValue`) and pattern-level values
/// (`DocumentRange`) alike.
pub trait PatternInstance: fmt::Debug {
    /// Kind of the member `native_name`, or `None` if the instance lacks it
    fn member_kind(&self, native_name: &str) -> Option<MemberKind>;

    /// Whether the instance exposes `native_name`
    fn has_member(&self, native_name: &str) -> bool {
        self.member_kind(native_name).is_some()
    }

    /// Call the member `native_name`; value members take no arguments
    fn call(&self, native_name: &str, args: &[PropertyValue]) -> OracleResult<PropertyValue>;
}

/// Keystroke injection, for input that has no pattern equivalent
pub trait KeyInjector {
    /// Send `keys` to whatever currently has focus
    fn send_keys(&self, keys: &str) -> OracleResult<()>;
}
