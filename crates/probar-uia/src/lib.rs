//! Probar UIA: accessibility-tree automation.
//!
//! A thin, dynamic layer over a platform accessibility provider (the
//! *oracle*). It discovers every pattern and property the provider exposes,
//! lets callers address them by name, builds search filters from those names,
//! and polls the tree under a timeout / minimum-search / minimum-count policy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PROBAR UIA Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Automation │───►│ Element    │───►│ Search     │            │
//! │   │ + Registry │    │ proxy      │    │ engine     │            │
//! │   └─────┬──────┘    └─────┬──────┘    └─────┬──────┘            │
//! │         └─────────────────┼─────────────────┘                   │
//! │                     ┌─────▼──────┐                              │
//! │                     │ Oracle     │  (platform provider / mock)  │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use probar_uia::mock::{ids, MockOracle};
//! use probar_uia::prelude::*;
//!
//! let oracle = MockOracle::with_standard_catalog();
//! let window = oracle.add_child(oracle.root_id(), "Notepad");
//! oracle.add_pattern(window, ids::WINDOW_PATTERN);
//!
//! let automation = Automation::new(oracle)?;
//! let desktop = automation.desktop()?;
//! let notepad = desktop
//!     .find_element(Filter::new().with("name", "Notepad"), &automation.find_options())?
//!     .expect("window is in the tree");
//! assert!(notepad.get::<bool>("is_window")?);
//! # Ok::<(), probar_uia::UiaError>(())
//! ```

#![warn(missing_docs)]

mod automation;
/// Time sources and deadlines
pub mod clock;
/// Condition algebra
pub mod condition;
/// Configuration
pub mod config;
mod element;
/// Logging setup
pub mod logging;
/// Scripted oracle for tests and examples
pub mod mock;
/// Identifier normalization
pub mod naming;
mod oracle;
/// Capability registry
pub mod registry;
mod result;
/// Polling search engine
pub mod search;
mod value;

pub use automation::Automation;
pub use clock::{Clock, Deadline, FakeClock, SystemClock, Timeout};
pub use condition::{and_, or_, Condition, Filter, PropertyCondition};
pub use config::{AutomationConfig, IdRange, RegistryConfig, SearchDefaults};
pub use element::{Attribute, BoundMember, Element, SupportedProperties};
pub use logging::{init_logging, Verbosity};
pub use oracle::{IdentifierInfo, KeyInjector, MemberKind, Oracle, PatternInstance};
pub use registry::{CapabilityRegistry, Pattern, Property, PropertyGroup};
pub use result::{OracleError, OracleResult, UiaError, UiaResult};
pub use search::{FindOptions, SearchEngine, SearchPolicy, TreeScope};
pub use value::{PropertyValue, Rect};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        and_, or_, Automation, Condition, Element, Filter, FindOptions, Oracle, PropertyValue,
        Timeout, TreeScope, UiaError, UiaResult,
    };
}
