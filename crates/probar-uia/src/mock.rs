//! Scripted in-memory oracle for tests.
//!
//! [`MockOracle`] holds a small tree of nodes with property values and
//! patterns, evaluates conditions itself, and records every node-level call
//! so tests can assert on polling behavior. Find results can be scripted per
//! poll; once a script runs out the tree is searched normally.
//!
//! Attach a [`FakeClock`] with [`MockOracle::with_clock`] to make each find,
//! liveness and off-screen probe cost a fixed number of milliseconds.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use crate::clock::FakeClock;
use crate::condition::Condition;
use crate::oracle::{IdentifierInfo, KeyInjector, MemberKind, Oracle, PatternInstance};
use crate::registry::{Pattern, Property};
use crate::result::{OracleError, OracleResult};
use crate::search::TreeScope;
use crate::value::{PropertyValue, Rect};

/// Identifier constants of the standard catalog
pub mod ids {
    #![allow(missing_docs)]

    pub const INVOKE_PATTERN: i32 = 10000;
    pub const VALUE_PATTERN: i32 = 10002;
    pub const RANGE_VALUE_PATTERN: i32 = 10003;
    pub const EXPAND_COLLAPSE_PATTERN: i32 = 10005;
    pub const WINDOW_PATTERN: i32 = 10009;
    pub const TEXT_PATTERN: i32 = 10014;
    pub const TOGGLE_PATTERN: i32 = 10015;

    pub const RUNTIME_ID: i32 = 30000;
    pub const BOUNDING_RECTANGLE: i32 = 30001;
    pub const PROCESS_ID: i32 = 30002;
    pub const CONTROL_TYPE: i32 = 30003;
    pub const NAME: i32 = 30005;
    pub const HAS_KEYBOARD_FOCUS: i32 = 30008;
    pub const IS_ENABLED: i32 = 30010;
    pub const AUTOMATION_ID: i32 = 30011;
    pub const CLASS_NAME: i32 = 30012;
    pub const IS_OFFSCREEN: i32 = 30022;
    pub const IS_EXPAND_COLLAPSE_PATTERN_AVAILABLE: i32 = 30028;
    pub const IS_INVOKE_PATTERN_AVAILABLE: i32 = 30031;
    pub const IS_RANGE_VALUE_PATTERN_AVAILABLE: i32 = 30033;
    pub const IS_TEXT_PATTERN_AVAILABLE: i32 = 30040;
    pub const IS_TOGGLE_PATTERN_AVAILABLE: i32 = 30041;
    pub const IS_VALUE_PATTERN_AVAILABLE: i32 = 30043;
    pub const IS_WINDOW_PATTERN_AVAILABLE: i32 = 30044;
    pub const VALUE_VALUE: i32 = 30045;
    pub const VALUE_IS_READ_ONLY: i32 = 30046;
    pub const RANGE_VALUE_VALUE: i32 = 30047;
    pub const RANGE_VALUE_IS_READ_ONLY: i32 = 30048;
    pub const RANGE_VALUE_MINIMUM: i32 = 30049;
    pub const RANGE_VALUE_MAXIMUM: i32 = 30050;
    pub const EXPAND_COLLAPSE_STATE: i32 = 30070;
    pub const WINDOW_CAN_MAXIMIZE: i32 = 30073;
    pub const WINDOW_CAN_MINIMIZE: i32 = 30074;
    pub const WINDOW_VISUAL_STATE: i32 = 30075;
    pub const TOGGLE_STATE: i32 = 30086;
}

const BASE_OWNER: &str = "AutomationElementIdentifiers";
const DEFAULT_PROCESS_ID: u32 = 4242;

const STANDARD_PATTERNS: &[(i32, &str)] = &[
    (ids::INVOKE_PATTERN, "Invoke"),
    (ids::VALUE_PATTERN, "Value"),
    (ids::RANGE_VALUE_PATTERN, "RangeValue"),
    (ids::EXPAND_COLLAPSE_PATTERN, "ExpandCollapse"),
    (ids::WINDOW_PATTERN, "Window"),
    (ids::TEXT_PATTERN, "Text"),
    (ids::TOGGLE_PATTERN, "Toggle"),
];

const STANDARD_PROPERTIES: &[(i32, &str, &str)] = &[
    (ids::RUNTIME_ID, BASE_OWNER, "RuntimeId"),
    (ids::BOUNDING_RECTANGLE, BASE_OWNER, "BoundingRectangle"),
    (ids::PROCESS_ID, BASE_OWNER, "ProcessId"),
    (ids::CONTROL_TYPE, BASE_OWNER, "ControlType"),
    (ids::NAME, BASE_OWNER, "Name"),
    (ids::HAS_KEYBOARD_FOCUS, BASE_OWNER, "HasKeyboardFocus"),
    (ids::IS_ENABLED, BASE_OWNER, "IsEnabled"),
    (ids::AUTOMATION_ID, BASE_OWNER, "AutomationId"),
    (ids::CLASS_NAME, BASE_OWNER, "ClassName"),
    (ids::IS_OFFSCREEN, BASE_OWNER, "IsOffscreen"),
    (ids::IS_EXPAND_COLLAPSE_PATTERN_AVAILABLE, BASE_OWNER, "IsExpandCollapsePatternAvailable"),
    (ids::IS_INVOKE_PATTERN_AVAILABLE, BASE_OWNER, "IsInvokePatternAvailable"),
    (ids::IS_RANGE_VALUE_PATTERN_AVAILABLE, BASE_OWNER, "IsRangeValuePatternAvailable"),
    (ids::IS_TEXT_PATTERN_AVAILABLE, BASE_OWNER, "IsTextPatternAvailable"),
    (ids::IS_TOGGLE_PATTERN_AVAILABLE, BASE_OWNER, "IsTogglePatternAvailable"),
    (ids::IS_VALUE_PATTERN_AVAILABLE, BASE_OWNER, "IsValuePatternAvailable"),
    (ids::IS_WINDOW_PATTERN_AVAILABLE, BASE_OWNER, "IsWindowPatternAvailable"),
    (ids::VALUE_VALUE, "ValuePatternIdentifiers", "Value"),
    (ids::VALUE_IS_READ_ONLY, "ValuePatternIdentifiers", "IsReadOnly"),
    (ids::RANGE_VALUE_VALUE, "RangeValuePatternIdentifiers", "Value"),
    (ids::RANGE_VALUE_IS_READ_ONLY, "RangeValuePatternIdentifiers", "IsReadOnly"),
    (ids::RANGE_VALUE_MINIMUM, "RangeValuePatternIdentifiers", "Minimum"),
    (ids::RANGE_VALUE_MAXIMUM, "RangeValuePatternIdentifiers", "Maximum"),
    (ids::EXPAND_COLLAPSE_STATE, "ExpandCollapsePatternIdentifiers", "ExpandCollapseState"),
    (ids::WINDOW_CAN_MAXIMIZE, "WindowPatternIdentifiers", "CanMaximize"),
    (ids::WINDOW_CAN_MINIMIZE, "WindowPatternIdentifiers", "CanMinimize"),
    (ids::WINDOW_VISUAL_STATE, "WindowPatternIdentifiers", "WindowVisualState"),
    (ids::TOGGLE_STATE, "TogglePatternIdentifiers", "ToggleState"),
];

fn members_of(pattern: &str) -> &'static [(&'static str, MemberKind)] {
    use MemberKind::{Method, Value};
    match pattern {
        "Invoke" => &[("Invoke", Method)],
        "Value" | "RangeValue" => &[("SetValue", Method)],
        "Window" => &[("Close", Method), ("SetWindowVisualState", Method)],
        "Toggle" => &[("Toggle", Method)],
        "ExpandCollapse" => &[("Expand", Method), ("Collapse", Method)],
        "Text" => &[("DocumentRange", Value)],
        _ => &[],
    }
}

/// Handle of a node in a [`MockOracle`] tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MockNodeId(pub u32);

/// What happens when a pattern member is called on a node
#[derive(Debug, Clone, PartialEq)]
pub enum MockEffect {
    /// Return this value
    Return(PropertyValue),
    /// The node becomes unavailable (a window closing)
    Remove,
    /// The call fails
    Fail(OracleError),
}

#[derive(Debug, Clone)]
struct MockNode {
    parent: Option<MockNodeId>,
    children: Vec<MockNodeId>,
    values: BTreeMap<i32, PropertyValue>,
    patterns: Vec<i32>,
    available: bool,
    offscreen: bool,
    process_id: u32,
    probes_left: Option<u32>,
}

impl MockNode {
    fn new(parent: Option<MockNodeId>, name: &str, process_id: u32) -> Self {
        let mut values = BTreeMap::new();
        values.insert(ids::NAME, PropertyValue::from(name));
        values.insert(ids::PROCESS_ID, PropertyValue::from(process_id));
        values.insert(ids::IS_OFFSCREEN, PropertyValue::Bool(false));
        Self {
            parent,
            children: Vec::new(),
            values,
            patterns: Vec::new(),
            available: true,
            offscreen: false,
            process_id,
            probes_left: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    nodes: Vec<MockNode>,
    focused: u32,
    call_history: Vec<String>,
    first_script: VecDeque<Option<MockNodeId>>,
    all_script: VecDeque<Vec<MockNodeId>>,
    failures: BTreeMap<String, VecDeque<OracleError>>,
    effects: BTreeMap<(MockNodeId, String), MockEffect>,
    sent_keys: Vec<String>,
}

/// Mock oracle for unit testing
#[derive(Debug)]
pub struct MockOracle {
    patterns: BTreeMap<i32, IdentifierInfo>,
    properties: BTreeMap<i32, IdentifierInfo>,
    state: RefCell<MockState>,
    clock: Option<(Arc<FakeClock>, u64)>,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOracle {
    /// Create a mock with an empty catalog and a lone `Desktop` root
    #[must_use]
    pub fn new() -> Self {
        let state = MockState {
            nodes: vec![MockNode::new(None, "Desktop", 0)],
            ..MockState::default()
        };
        Self {
            patterns: BTreeMap::new(),
            properties: BTreeMap::new(),
            state: RefCell::new(state),
            clock: None,
        }
    }

    /// Create a mock whose catalog holds the common patterns and properties
    #[must_use]
    pub fn with_standard_catalog() -> Self {
        let mut oracle = Self::new();
        for (id, name) in STANDARD_PATTERNS {
            oracle.add_pattern_info(IdentifierInfo::new(
                *id,
                *name,
                format!("{name}PatternIdentifiers.Pattern"),
            ));
        }
        for (id, owner, name) in STANDARD_PROPERTIES {
            oracle.add_property_info(IdentifierInfo::new(
                *id,
                *name,
                format!("{owner}.{name}Property"),
            ));
        }
        oracle
    }

    /// Advance `clock` by `tick_ms` on every find, liveness and off-screen probe
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<FakeClock>, tick_ms: u64) -> Self {
        self.clock = Some((clock, tick_ms));
        self
    }

    /// Add a pattern to the catalog
    pub fn add_pattern_info(&mut self, info: IdentifierInfo) {
        self.patterns.insert(info.id, info);
    }

    /// Add a property to the catalog
    pub fn add_property_info(&mut self, info: IdentifierInfo) {
        self.properties.insert(info.id, info);
    }

    /// The root node
    #[must_use]
    pub const fn root_id(&self) -> MockNodeId {
        MockNodeId(0)
    }

    /// Append a child named `name` under `parent`
    pub fn add_child(&self, parent: MockNodeId, name: &str) -> MockNodeId {
        let mut state = self.state.borrow_mut();
        let id = MockNodeId(u32::try_from(state.nodes.len()).unwrap_or(u32::MAX));
        state
            .nodes
            .push(MockNode::new(Some(parent), name, DEFAULT_PROCESS_ID));
        if let Some(node) = state.nodes.get_mut(parent.0 as usize) {
            node.children.push(id);
        }
        id
    }

    fn with_node<R>(&self, id: MockNodeId, f: impl FnOnce(&mut MockNode) -> R) -> Option<R> {
        self.state.borrow_mut().nodes.get_mut(id.0 as usize).map(f)
    }

    /// Set a property value on a node
    pub fn set_property(&self, id: MockNodeId, property: i32, value: impl Into<PropertyValue>) {
        let value = value.into();
        self.with_node(id, |node| node.values.insert(property, value));
    }

    /// Give a node a pattern; its `Is<X>PatternAvailable` property turns true
    pub fn add_pattern(&self, id: MockNodeId, pattern: i32) {
        let available = self.patterns.get(&pattern).and_then(|info| {
            let wanted = format!("Is{}PatternAvailable", info.name);
            self.properties
                .values()
                .find(|p| p.name == wanted)
                .map(|p| p.id)
        });
        self.with_node(id, |node| {
            node.patterns.push(pattern);
            if let Some(property) = available {
                node.values.insert(property, PropertyValue::Bool(true));
            }
        });
    }

    /// Mark a node (and, for finds, its subtree) gone or back
    pub fn set_available(&self, id: MockNodeId, available: bool) {
        self.with_node(id, |node| node.available = available);
    }

    /// Mark a node off-screen
    pub fn set_offscreen(&self, id: MockNodeId, offscreen: bool) {
        self.with_node(id, |node| {
            node.offscreen = offscreen;
            node.values.insert(ids::IS_OFFSCREEN, PropertyValue::Bool(offscreen));
        });
    }

    /// Set the node's screen rectangle
    pub fn set_bounds(&self, id: MockNodeId, rect: Rect) {
        self.set_property(id, ids::BOUNDING_RECTANGLE, rect);
    }

    /// The node answers `probes` more liveness probes, then disappears
    pub fn schedule_unavailable(&self, id: MockNodeId, probes: u32) {
        self.with_node(id, |node| node.probes_left = Some(probes));
    }

    /// Node reported as focused
    pub fn set_focused(&self, id: MockNodeId) {
        self.state.borrow_mut().focused = id.0;
    }

    /// Queue `find_first` answers, one per poll
    pub fn script_find_first(&self, results: impl IntoIterator<Item = Option<MockNodeId>>) {
        self.state.borrow_mut().first_script.extend(results);
    }

    /// Queue `find_all` answers, one per poll
    pub fn script_find_all(&self, results: impl IntoIterator<Item = Vec<MockNodeId>>) {
        self.state.borrow_mut().all_script.extend(results);
    }

    /// Make the next call to `method` fail with `error`
    pub fn fail_next(&self, method: &str, error: OracleError) {
        self.state
            .borrow_mut()
            .failures
            .entry(method.to_string())
            .or_default()
            .push_back(error);
    }

    /// Effect of calling pattern member `member` on `id`
    pub fn on_call(&self, id: MockNodeId, member: &str, effect: MockEffect) {
        self.state
            .borrow_mut()
            .effects
            .insert((id, member.to_string()), effect);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Number of recorded calls to `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        let prefix = format!("{method}:");
        self.state
            .borrow()
            .call_history
            .iter()
            .filter(|c| c.as_str() == method || c.starts_with(&prefix))
            .count()
    }

    /// Keystrokes received through [`KeyInjector`]
    #[must_use]
    pub fn sent_keys(&self) -> Vec<String> {
        self.state.borrow().sent_keys.clone()
    }

    fn tick(&self) {
        if let Some((clock, ms)) = &self.clock {
            clock.advance_ms(*ms);
        }
    }

    /// Record the call, then apply any injected failure and staleness
    fn enter(&self, method: &str, id: MockNodeId) -> OracleResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("{method}:{}", id.0));
        if let Some(error) = state.failures.get_mut(method).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        match state.nodes.get(id.0 as usize) {
            Some(node) if node.available => Ok(()),
            _ => Err(OracleError::ElementUnavailable),
        }
    }

    fn candidates(state: &MockState, id: MockNodeId, scope: TreeScope) -> Vec<MockNodeId> {
        fn walk(state: &MockState, id: MockNodeId, out: &mut Vec<MockNodeId>) {
            let Some(node) = state.nodes.get(id.0 as usize) else {
                return;
            };
            for child in &node.children {
                if state.nodes.get(child.0 as usize).is_some_and(|c| c.available) {
                    out.push(*child);
                    walk(state, *child, out);
                }
            }
        }

        let mut out = Vec::new();
        if scope.includes_self() {
            out.push(id);
        }
        match scope {
            TreeScope::Element => {}
            TreeScope::Children => {
                if let Some(node) = state.nodes.get(id.0 as usize) {
                    out.extend(node.children.iter().copied().filter(|child| {
                        state.nodes.get(child.0 as usize).is_some_and(|c| c.available)
                    }));
                }
            }
            TreeScope::Descendants | TreeScope::Subtree => walk(state, id, &mut out),
        }
        out
    }

    fn matching(&self, id: MockNodeId, scope: TreeScope, condition: &Condition) -> Vec<MockNodeId> {
        let state = self.state.borrow();
        Self::candidates(&state, id, scope)
            .into_iter()
            .filter(|candidate| {
                let values = &state.nodes[candidate.0 as usize].values;
                condition.evaluate(&mut |property: &Property| values.get(&property.id).cloned())
            })
            .collect()
    }

    fn setter_target(&self, pattern: &Pattern, member: &str) -> Option<i32> {
        let name = member.strip_prefix("Set")?;
        let owner = pattern.programmatic_name.split_once('.')?.0;
        let wanted = format!("{owner}.{name}Property");
        self.properties
            .values()
            .find(|p| p.programmatic_name == wanted)
            .map(|p| p.id)
    }
}

impl Oracle for MockOracle {
    type Node = MockNodeId;

    fn pattern_info(&self, id: i32) -> Option<IdentifierInfo> {
        self.patterns.get(&id).cloned()
    }

    fn property_info(&self, id: i32) -> Option<IdentifierInfo> {
        self.properties.get(&id).cloned()
    }

    fn root(&self) -> OracleResult<MockNodeId> {
        let root = self.root_id();
        self.enter("root", root)?;
        Ok(root)
    }

    fn focused(&self) -> OracleResult<MockNodeId> {
        let focused = MockNodeId(self.state.borrow().focused);
        self.enter("focused", focused)?;
        Ok(focused)
    }

    fn raw_parent(&self, node: &MockNodeId) -> OracleResult<Option<MockNodeId>> {
        self.enter("raw_parent", *node)?;
        Ok(self.with_node(*node, |n| n.parent).flatten())
    }

    fn supported_properties(&self, node: &MockNodeId) -> OracleResult<Vec<i32>> {
        self.enter("supported_properties", *node)?;
        Ok(self
            .with_node(*node, |n| n.values.keys().copied().collect())
            .unwrap_or_default())
    }

    fn supported_patterns(&self, node: &MockNodeId) -> OracleResult<Vec<i32>> {
        self.enter("supported_patterns", *node)?;
        Ok(self
            .with_node(*node, |n| n.patterns.clone())
            .unwrap_or_default())
    }

    fn property_value(&self, node: &MockNodeId, property: &Property) -> OracleResult<PropertyValue> {
        self.enter("property_value", *node)?;
        Ok(self
            .with_node(*node, |n| n.values.get(&property.id).cloned())
            .flatten()
            .unwrap_or_default())
    }

    fn pattern_instance<'a>(
        &'a self,
        node: &MockNodeId,
        pattern: &Pattern,
    ) -> OracleResult<Box<dyn PatternInstance + 'a>> {
        self.enter("pattern_instance", *node)?;
        let supported = self
            .with_node(*node, |n| n.patterns.contains(&pattern.id))
            .unwrap_or(false);
        if !supported {
            return Err(OracleError::not_supported(format!("pattern {}", pattern.name)));
        }
        Ok(Box::new(MockPatternInstance {
            oracle: self,
            node: *node,
            pattern: pattern.clone(),
            members: members_of(&pattern.name),
        }))
    }

    fn find_first(
        &self,
        node: &MockNodeId,
        scope: TreeScope,
        condition: &Condition,
    ) -> OracleResult<Option<MockNodeId>> {
        let entered = self.enter("find_first", *node);
        self.tick();
        entered?;
        let scripted = self.state.borrow_mut().first_script.pop_front();
        Ok(match scripted {
            Some(result) => result,
            None => self.matching(*node, scope, condition).into_iter().next(),
        })
    }

    fn find_all(
        &self,
        node: &MockNodeId,
        scope: TreeScope,
        condition: &Condition,
    ) -> OracleResult<Vec<MockNodeId>> {
        let entered = self.enter("find_all", *node);
        self.tick();
        entered?;
        let scripted = self.state.borrow_mut().all_script.pop_front();
        Ok(match scripted {
            Some(result) => result,
            None => self.matching(*node, scope, condition),
        })
    }

    fn process_id(&self, node: &MockNodeId) -> OracleResult<u32> {
        let entered = self.enter("process_id", *node);
        self.tick();
        entered?;
        let alive = self.with_node(*node, |n| match n.probes_left {
            Some(0) => {
                n.available = false;
                false
            }
            Some(left) => {
                n.probes_left = Some(left - 1);
                true
            }
            None => true,
        });
        match alive {
            Some(true) => Ok(self.with_node(*node, |n| n.process_id).unwrap_or_default()),
            _ => Err(OracleError::ElementUnavailable),
        }
    }

    fn is_offscreen(&self, node: &MockNodeId) -> OracleResult<bool> {
        let entered = self.enter("is_offscreen", *node);
        self.tick();
        entered?;
        Ok(self.with_node(*node, |n| n.offscreen).unwrap_or(false))
    }

    fn base_attribute(
        &self,
        node: &MockNodeId,
        native_name: &str,
    ) -> OracleResult<Option<PropertyValue>> {
        self.enter("base_attribute", *node)?;
        Ok(match native_name {
            "NodeId" => Some(PropertyValue::from(node.0)),
            _ => None,
        })
    }
}

impl KeyInjector for MockOracle {
    fn send_keys(&self, keys: &str) -> OracleResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("send_keys:{keys}"));
        if let Some(error) = state.failures.get_mut("send_keys").and_then(VecDeque::pop_front) {
            return Err(error);
        }
        state.sent_keys.push(keys.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct MockPatternInstance<'a> {
    oracle: &'a MockOracle,
    node: MockNodeId,
    pattern: Pattern,
    members: &'static [(&'static str, MemberKind)],
}

impl PatternInstance for MockPatternInstance<'_> {
    fn member_kind(&self, native_name: &str) -> Option<MemberKind> {
        self.members
            .iter()
            .find(|(name, _)| *name == native_name)
            .map(|(_, kind)| *kind)
    }

    fn call(&self, native_name: &str, args: &[PropertyValue]) -> OracleResult<PropertyValue> {
        self.oracle.enter(&format!("call:{native_name}"), self.node)?;
        if !self.has_member(native_name) {
            return Err(OracleError::not_supported(format!(
                "{}.{native_name}",
                self.pattern.name
            )));
        }
        if let (Some(property), Some(value)) =
            (self.oracle.setter_target(&self.pattern, native_name), args.first())
        {
            self.oracle.set_property(self.node, property, value.clone());
        }
        let effect = self
            .oracle
            .state
            .borrow()
            .effects
            .get(&(self.node, native_name.to_string()))
            .cloned();
        match effect {
            Some(MockEffect::Return(value)) => Ok(value),
            Some(MockEffect::Remove) => {
                self.oracle.set_available(self.node, false);
                Ok(PropertyValue::Empty)
            }
            Some(MockEffect::Fail(error)) => Err(error),
            None => Ok(PropertyValue::Empty),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn leaf(id: i32, name: &str, value: impl Into<PropertyValue>) -> Condition {
        Condition::property(
            &Property {
                id,
                name: name.to_string(),
                programmatic_name: format!("{BASE_OWNER}.{name}Property"),
                group: BASE_OWNER.to_string(),
            },
            value,
        )
    }

    #[test]
    fn test_standard_catalog() {
        let oracle = MockOracle::with_standard_catalog();
        let value = oracle.pattern_info(ids::VALUE_PATTERN).unwrap();
        assert_eq!(value.programmatic_name, "ValuePatternIdentifiers.Pattern");
        let read_only = oracle.property_info(ids::RANGE_VALUE_IS_READ_ONLY).unwrap();
        assert_eq!(read_only.programmatic_name, "RangeValuePatternIdentifiers.IsReadOnlyProperty");
        assert!(oracle.property_info(29_999).is_none());
    }

    mod tree_tests {
        use super::*;

        #[test]
        fn test_scopes() {
            let oracle = MockOracle::new();
            let root = oracle.root_id();
            let a = oracle.add_child(root, "a");
            let b = oracle.add_child(a, "b");
            let c = oracle.add_child(root, "c");
            let state = oracle.state.borrow();
            assert_eq!(MockOracle::candidates(&state, root, TreeScope::Element), vec![root]);
            assert_eq!(MockOracle::candidates(&state, root, TreeScope::Children), vec![a, c]);
            assert_eq!(
                MockOracle::candidates(&state, root, TreeScope::Descendants),
                vec![a, b, c]
            );
            assert_eq!(
                MockOracle::candidates(&state, root, TreeScope::Subtree),
                vec![root, a, b, c]
            );
        }

        #[test]
        fn test_unavailable_subtree_is_skipped() {
            let oracle = MockOracle::new();
            let root = oracle.root_id();
            let a = oracle.add_child(root, "a");
            oracle.add_child(a, "b");
            oracle.set_available(a, false);
            let found = oracle
                .find_all(&root, TreeScope::Descendants, &Condition::True)
                .unwrap();
            assert!(found.is_empty());
        }

        #[test]
        fn test_condition_evaluation() {
            let oracle = MockOracle::new();
            let root = oracle.root_id();
            oracle.add_child(root, "a");
            let b = oracle.add_child(root, "b");
            let hit = oracle
                .find_first(&root, TreeScope::Children, &leaf(ids::NAME, "Name", "b"))
                .unwrap();
            assert_eq!(hit, Some(b));
        }

        #[test]
        fn test_scripts_run_before_tree() {
            let oracle = MockOracle::new();
            let root = oracle.root_id();
            let a = oracle.add_child(root, "a");
            oracle.script_find_first([None]);
            assert_eq!(oracle.find_first(&root, TreeScope::Children, &Condition::True).unwrap(), None);
            assert_eq!(
                oracle.find_first(&root, TreeScope::Children, &Condition::True).unwrap(),
                Some(a)
            );
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_clock_ticks_per_probe() {
            let clock = Arc::new(FakeClock::new());
            let oracle = MockOracle::new().with_clock(Arc::clone(&clock), 7);
            let root = oracle.root_id();
            oracle.process_id(&root).unwrap();
            oracle.is_offscreen(&root).unwrap();
            oracle.find_all(&root, TreeScope::Children, &Condition::True).unwrap();
            assert_eq!(clock.elapsed_ms(), 21);
        }

        #[test]
        fn test_fail_next_is_consumed() {
            let oracle = MockOracle::new();
            let root = oracle.root_id();
            oracle.fail_next("process_id", OracleError::failed("boom"));
            assert!(oracle.process_id(&root).is_err());
            assert_eq!(oracle.process_id(&root).unwrap(), 0);
            assert_eq!(oracle.call_count("process_id"), 2);
        }

        #[test]
        fn test_schedule_unavailable() {
            let oracle = MockOracle::new();
            let node = oracle.add_child(oracle.root_id(), "w");
            oracle.schedule_unavailable(node, 1);
            assert_eq!(oracle.process_id(&node).unwrap(), DEFAULT_PROCESS_ID);
            assert!(oracle.process_id(&node).unwrap_err().is_unavailable());
            assert!(oracle.raw_parent(&node).unwrap_err().is_unavailable());
        }
    }

    mod pattern_tests {
        use super::*;

        fn value_pattern(oracle: &MockOracle) -> Pattern {
            Pattern::from(oracle.pattern_info(ids::VALUE_PATTERN).unwrap())
        }

        #[test]
        fn test_add_pattern_sets_availability() {
            let oracle = MockOracle::with_standard_catalog();
            let node = oracle.add_child(oracle.root_id(), "edit");
            oracle.add_pattern(node, ids::VALUE_PATTERN);
            let values = oracle.with_node(node, |n| n.values.clone()).unwrap();
            assert_eq!(values[&ids::IS_VALUE_PATTERN_AVAILABLE], PropertyValue::Bool(true));
        }

        #[test]
        fn test_setter_writes_property() {
            let oracle = MockOracle::with_standard_catalog();
            let node = oracle.add_child(oracle.root_id(), "edit");
            oracle.add_pattern(node, ids::VALUE_PATTERN);
            let instance = oracle.pattern_instance(&node, &value_pattern(&oracle)).unwrap();
            instance.call("SetValue", &["hello".into()]).unwrap();
            let values = oracle.with_node(node, |n| n.values.clone()).unwrap();
            assert_eq!(values[&ids::VALUE_VALUE], PropertyValue::from("hello"));
            assert!(!values.contains_key(&ids::RANGE_VALUE_VALUE));
        }

        #[test]
        fn test_member_kinds() {
            let oracle = MockOracle::with_standard_catalog();
            let node = oracle.add_child(oracle.root_id(), "edit");
            oracle.add_pattern(node, ids::VALUE_PATTERN);
            oracle.add_pattern(node, ids::TEXT_PATTERN);
            let value = oracle.pattern_instance(&node, &value_pattern(&oracle)).unwrap();
            assert_eq!(value.member_kind("SetValue"), Some(MemberKind::Method));
            assert_eq!(value.member_kind("DocumentRange"), None);
            assert!(!value.has_member("Value"));

            let text = Pattern::from(oracle.pattern_info(ids::TEXT_PATTERN).unwrap());
            let text = oracle.pattern_instance(&node, &text).unwrap();
            assert_eq!(text.member_kind("DocumentRange"), Some(MemberKind::Value));
        }

        #[test]
        fn test_instance_for_unsupported_pattern() {
            let oracle = MockOracle::with_standard_catalog();
            let node = oracle.add_child(oracle.root_id(), "label");
            let err = oracle
                .pattern_instance(&node, &value_pattern(&oracle))
                .unwrap_err();
            assert!(matches!(err, OracleError::NotSupported { .. }));
        }

        #[test]
        fn test_effect_failure() {
            let oracle = MockOracle::with_standard_catalog();
            let node = oracle.add_child(oracle.root_id(), "edit");
            oracle.add_pattern(node, ids::VALUE_PATTERN);
            oracle.on_call(node, "SetValue", MockEffect::Fail(OracleError::failed("denied")));
            let instance = oracle.pattern_instance(&node, &value_pattern(&oracle)).unwrap();
            assert!(instance.call("SetValue", &["x".into()]).is_err());
        }
    }

    #[test]
    fn test_send_keys_is_recorded() {
        let oracle = MockOracle::new();
        oracle.send_keys("{Ctrl}a").unwrap();
        assert_eq!(oracle.sent_keys(), vec!["{Ctrl}a".to_string()]);
        assert!(oracle.was_called("send_keys"));
    }
}
