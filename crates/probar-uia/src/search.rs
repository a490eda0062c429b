//! Polling search engine.
//!
//! A find is a loop of raw oracle calls. There is no delay between polls;
//! the oracle's own latency sets the pace.
//!
//! ## Termination
//!
//! After every poll the engine keeps going while
//!
//! ```text
//! deadline is after now  OR  remaining min_searches > 0
//! ```
//!
//! and each poll decrements the min-searches counter. A non-zero
//! `min_searches` therefore guarantees that many polls even when the deadline
//! has already passed. `find_one` also stops on the first hit; `find_many`
//! stops as soon as the latest result set reaches `min_count`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace};

use crate::clock::{Clock, Deadline, Timeout};
use crate::condition::Condition;
use crate::config::SearchDefaults;
use crate::oracle::Oracle;
use crate::result::UiaResult;

/// Which part of the tree a find examines, relative to the starting node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeScope {
    /// The starting node only
    Element,
    /// Immediate children
    Children,
    /// All descendants, excluding the starting node
    #[default]
    Descendants,
    /// The starting node and all descendants
    Subtree,
}

impl TreeScope {
    /// Whether the starting node itself is a candidate
    #[must_use]
    pub const fn includes_self(self) -> bool {
        matches!(self, Self::Element | Self::Subtree)
    }

    /// Whether nodes below the immediate children are candidates
    #[must_use]
    pub const fn is_deep(self) -> bool {
        matches!(self, Self::Descendants | Self::Subtree)
    }
}

impl fmt::Display for TreeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Element => "element",
            Self::Children => "children",
            Self::Descendants => "descendants",
            Self::Subtree => "subtree",
        };
        write!(f, "{s}")
    }
}

/// Per-call find options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    /// How long to keep polling
    pub timeout: Timeout,
    /// Polls guaranteed regardless of the timeout
    pub min_searches: u32,
    /// Search scope
    pub scope: TreeScope,
    /// Result count that ends a multi-result find early (at least 1)
    pub min_count: usize,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::from_defaults(&SearchDefaults::default())
    }
}

impl FindOptions {
    /// Options taken from configured defaults
    #[must_use]
    pub fn from_defaults(defaults: &SearchDefaults) -> Self {
        Self {
            timeout: Timeout::from(defaults.timeout()),
            min_searches: defaults.min_searches,
            scope: defaults.scope,
            min_count: 1,
        }
    }

    /// Set the timeout
    #[must_use]
    pub fn timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Set the minimum number of polls
    #[must_use]
    pub const fn min_searches(mut self, min_searches: u32) -> Self {
        self.min_searches = min_searches;
        self
    }

    /// Set the scope
    #[must_use]
    pub const fn scope(mut self, scope: TreeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the count that ends a multi-result find; clamped to at least 1
    #[must_use]
    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count.max(1);
        self
    }
}

/// Fully-resolved parameters of one find call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    /// Filter
    pub condition: Condition,
    /// Scope relative to the starting node
    pub scope: TreeScope,
    /// When polling may stop
    pub deadline: Deadline,
    /// Polls guaranteed regardless of the deadline
    pub min_searches: u32,
    /// Result count that ends a multi-result find early
    pub min_count: usize,
}

impl SearchPolicy {
    /// Fix `options` against the instant the search starts
    #[must_use]
    pub fn new(condition: Condition, options: &FindOptions, now: Instant) -> Self {
        Self {
            condition,
            scope: options.scope,
            deadline: options.timeout.deadline_from(now),
            min_searches: options.min_searches,
            min_count: options.min_count.max(1),
        }
    }

    /// The stopping predicate, evaluated after each poll
    #[must_use]
    pub fn should_continue(&self, now: Instant, remaining: u32) -> bool {
        self.deadline.is_after(now) || remaining > 0
    }
}

/// Runs searches against an oracle on behalf of a starting node
pub struct SearchEngine<'a, O: Oracle + ?Sized> {
    oracle: &'a O,
    clock: &'a dyn Clock,
}

impl<O: Oracle + ?Sized> fmt::Debug for SearchEngine<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<'a, O: Oracle + ?Sized> SearchEngine<'a, O> {
    /// Create an engine
    #[must_use]
    pub fn new(oracle: &'a O, clock: &'a dyn Clock) -> Self {
        Self { oracle, clock }
    }

    /// Poll for the first node matching the policy.
    ///
    /// `Ok(None)` means nothing matched before the policy gave up.
    ///
    /// # Errors
    ///
    /// Any oracle failure ends the search and is returned as is.
    pub fn find_one(&self, root: &O::Node, policy: &SearchPolicy) -> UiaResult<Option<O::Node>> {
        let started = self.clock.now();
        let mut remaining = policy.min_searches;
        let mut polls: u32 = 0;
        loop {
            polls += 1;
            remaining = remaining.saturating_sub(1);
            let hit = self
                .oracle
                .find_first(root, policy.scope, &policy.condition)?;
            trace!(poll = polls, found = hit.is_some(), "find_first poll");
            if hit.is_some() {
                debug!(
                    polls,
                    elapsed_ms = elapsed_ms(started, self.clock.now()),
                    scope = %policy.scope,
                    "find_one matched"
                );
                return Ok(hit);
            }
            if !policy.should_continue(self.clock.now(), remaining) {
                debug!(
                    polls,
                    elapsed_ms = elapsed_ms(started, self.clock.now()),
                    condition = %policy.condition,
                    "find_one gave up"
                );
                return Ok(None);
            }
        }
    }

    /// Poll for all nodes matching the policy.
    ///
    /// Returns the result set of the last poll, which may hold fewer than
    /// `min_count` nodes or none at all.
    ///
    /// # Errors
    ///
    /// Any oracle failure ends the search and is returned as is.
    pub fn find_many(&self, root: &O::Node, policy: &SearchPolicy) -> UiaResult<Vec<O::Node>> {
        let started = self.clock.now();
        let mut remaining = policy.min_searches;
        let mut polls: u32 = 0;
        loop {
            polls += 1;
            remaining = remaining.saturating_sub(1);
            let found = self
                .oracle
                .find_all(root, policy.scope, &policy.condition)?;
            trace!(poll = polls, count = found.len(), "find_all poll");
            if found.len() >= policy.min_count {
                debug!(
                    polls,
                    count = found.len(),
                    elapsed_ms = elapsed_ms(started, self.clock.now()),
                    "find_many reached min_count"
                );
                return Ok(found);
            }
            if !policy.should_continue(self.clock.now(), remaining) {
                debug!(
                    polls,
                    count = found.len(),
                    min_count = policy.min_count,
                    elapsed_ms = elapsed_ms(started, self.clock.now()),
                    "find_many stopped short"
                );
                return Ok(found);
            }
        }
    }
}

fn elapsed_ms(from: Instant, to: Instant) -> u64 {
    u64::try_from(to.saturating_duration_since(from).as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{MockNodeId, MockOracle};
    use std::sync::Arc;
    use std::time::Duration;

    fn oracle_with_clock() -> (MockOracle, Arc<FakeClock>) {
        let clock = Arc::new(FakeClock::new());
        let oracle = MockOracle::with_standard_catalog().with_clock(Arc::clone(&clock), 1);
        (oracle, clock)
    }

    fn policy(options: &FindOptions, clock: &FakeClock) -> SearchPolicy {
        SearchPolicy::new(Condition::True, options, clock.now())
    }

    mod find_one_tests {
        use super::*;

        #[test]
        fn test_zero_timeout_polls_min_searches_times() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let options = FindOptions::default()
                .timeout(Duration::ZERO)
                .min_searches(2);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let policy = SearchPolicy::new(Condition::False, &options, clock.now());
            assert!(engine.find_one(&root, &policy).unwrap().is_none());
            assert_eq!(oracle.call_count("find_first"), 2);
        }

        #[test]
        fn test_min_searches_zero_still_polls_once() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let options = FindOptions::default().min_searches(0);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let policy = SearchPolicy::new(Condition::False, &options, clock.now());
            assert!(engine.find_one(&root, &policy).unwrap().is_none());
            assert_eq!(oracle.call_count("find_first"), 1);
        }

        #[test]
        fn test_polls_until_deadline() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let options = FindOptions::default()
                .timeout(Duration::from_millis(10))
                .min_searches(0);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let policy = SearchPolicy::new(Condition::False, &options, clock.now());
            assert!(engine.find_one(&root, &policy).unwrap().is_none());
            // one millisecond per poll; the tenth poll lands on the deadline
            assert_eq!(oracle.call_count("find_first"), 10);
        }

        #[test]
        fn test_returns_first_hit() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let target = oracle.add_child(root, "Target");
            oracle.script_find_first([None, None, Some(target)]);
            let options = FindOptions::default().timeout(Duration::from_secs(60));
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let found = engine.find_one(&root, &policy(&options, &clock)).unwrap();
            assert_eq!(found, Some(target));
            assert_eq!(oracle.call_count("find_first"), 3);
        }

        #[test]
        fn test_hit_ends_min_searches_early() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            oracle.add_child(root, "Target");
            let options = FindOptions::default().min_searches(5);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            assert!(engine
                .find_one(&root, &policy(&options, &clock))
                .unwrap()
                .is_some());
            assert_eq!(oracle.call_count("find_first"), 1);
        }

        #[test]
        fn test_oracle_error_propagates() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            oracle.set_available(root, false);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let err = engine
                .find_one(&root, &policy(&FindOptions::default(), &clock))
                .unwrap_err();
            assert!(err.is_unavailable());
        }
    }

    mod find_many_tests {
        use super::*;

        fn nodes(oracle: &MockOracle, count: usize) -> Vec<MockNodeId> {
            let root = oracle.root_id();
            (0..count)
                .map(|i| oracle.add_child(root, &format!("Item {i}")))
                .collect()
        }

        #[test]
        fn test_stops_when_min_count_reached() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let items = nodes(&oracle, 3);
            let one = vec![items[0]];
            oracle.script_find_all([
                one.clone(),
                one.clone(),
                one.clone(),
                one,
                items.clone(),
                items.clone(),
            ]);
            let options = FindOptions::default()
                .timeout(Duration::from_millis(5))
                .min_count(3);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let found = engine.find_many(&root, &policy(&options, &clock)).unwrap();
            assert_eq!(found, items);
            assert_eq!(oracle.call_count("find_all"), 5);
        }

        #[test]
        fn test_keeps_latest_not_accumulated() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let items = nodes(&oracle, 3);
            oracle.script_find_all([vec![items[0], items[1]], vec![items[2]]]);
            let options = FindOptions::default().min_searches(2).min_count(5);
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let found = engine.find_many(&root, &policy(&options, &clock)).unwrap();
            assert_eq!(found, vec![items[2]]);
        }

        #[test]
        fn test_empty_result_is_not_an_error() {
            let (oracle, clock) = oracle_with_clock();
            let root = oracle.root_id();
            let engine = SearchEngine::new(&oracle, clock.as_ref());
            let policy = SearchPolicy::new(Condition::False, &FindOptions::default(), clock.now());
            assert!(engine.find_many(&root, &policy).unwrap().is_empty());
        }

        #[test]
        fn test_min_count_is_at_least_one() {
            assert_eq!(FindOptions::default().min_count(0).min_count, 1);
        }
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_should_continue() {
            let now = Instant::now();
            let expired = SearchPolicy {
                condition: Condition::True,
                scope: TreeScope::Children,
                deadline: Deadline::At(now),
                min_searches: 0,
                min_count: 1,
            };
            assert!(!expired.should_continue(now, 0));
            assert!(expired.should_continue(now, 1));
            let forever = SearchPolicy {
                deadline: Deadline::Never,
                ..expired
            };
            assert!(forever.should_continue(now, 0));
        }

        #[test]
        fn test_options_from_defaults() {
            let defaults = SearchDefaults {
                timeout_ms: None,
                min_searches: 3,
                scope: TreeScope::Subtree,
            };
            let options = FindOptions::from_defaults(&defaults);
            assert_eq!(options.timeout, Timeout::Never);
            assert_eq!(options.min_searches, 3);
            assert_eq!(options.scope, TreeScope::Subtree);
            assert_eq!(options.min_count, 1);
        }

        #[test]
        fn test_scope_helpers() {
            assert!(TreeScope::Subtree.includes_self());
            assert!(!TreeScope::Descendants.includes_self());
            assert!(TreeScope::Descendants.is_deep());
            assert!(!TreeScope::Children.is_deep());
            assert_eq!(TreeScope::default().to_string(), "descendants");
        }

        #[test]
        fn test_scope_serde() {
            let json = serde_json::to_string(&TreeScope::Children).unwrap();
            assert_eq!(json, "\"children\"");
        }
    }
}
