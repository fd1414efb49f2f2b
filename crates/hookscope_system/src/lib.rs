//! Instance-scoped hooks exposed as instance-free callables (Layer 1).
//!
//! `hookscope_system` binds a set of named hook factories, each mapping an
//! instance to a callable, into a dispatch table whose entries resolve against
//! whichever instance is currently active:
//!
//! - [`HooksBuilder`] - Registers factories and returns typed [`Hook`] handles
//! - [`HooksSystem`] - Owns the dispatch table and the scoped-execution primitive
//! - [`HookTable`] - Name-keyed dispatch table
//! - [`HooksConfig`] - Lifecycle callbacks, error message, and [`ReentrancyPolicy`]
//!
//! # Architecture
//!
//! - **Layer 1** (`hookscope_system`): scoping and dispatch (this crate)
//! - **Layer 2** (`hookscope_state`): slot-indexed state and `use_state`-style hooks
//!
//! # Example
//!
//! ```
//! use hookscope_system::{HooksConfig, HooksSystem};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Session {
//!     visits: Mutex<u32>,
//! }
//!
//! let mut builder = HooksSystem::<Session>::builder();
//! let use_visit = builder
//!     .hook("use_visit", |session: &Arc<Session>| {
//!         let session = Arc::clone(session);
//!         move || {
//!             let mut visits = session.visits.lock();
//!             *visits += 1;
//!             *visits
//!         }
//!     })
//!     .unwrap();
//! let system = builder.build().unwrap();
//!
//! let session = Arc::new(Session::default());
//! system.with_instance(&session, || use_visit.call(())).unwrap().unwrap();
//! let visits = system.with_instance(&session, || use_visit.call(())).unwrap();
//! assert_eq!(visits.unwrap(), 2);
//!
//! // Outside of `with_instance` there is nothing to resolve against.
//! assert!(use_visit.call(()).is_err());
//! ```

/// Configuration and reentrancy policy.
pub mod config;

/// Error types.
pub mod error;

/// Hook handles and the callable trait.
pub mod hook;

/// System construction and scoped execution.
pub mod system;

/// The name-keyed dispatch table.
pub mod table;

mod context;

pub use config::{HooksConfig, LifecycleFn, ReentrancyPolicy};
pub use error::{
    BoxError, DEFAULT_OUTSIDE_SCOPE_MESSAGE, HookError, HookLookupError, HookRegistrationError,
};
pub use hook::{Hook, HookFn};
pub use system::{HooksBuilder, HooksSystem};
pub use table::HookTable;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::hook::*;
    pub use crate::system::*;
    pub use crate::table::*;
}
