//! # Hookscope Internal Library
//!
//! Re-exports the core hookscope crates for convenience.

/// Layer 1: scoped instances and hook dispatch.
pub use hookscope_system;

/// Layer 2: slot-indexed state hooks.
pub use hookscope_state;

/// Tracing subscriber configuration.
pub use hookscope_tracing;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookscope_state::{
        Setter, SlotError, StateHolder, StateRef, UseMemo, UseRef, UseState, state_builder,
        state_config, use_memo, use_ref, use_state,
    };
    pub use hookscope_system::prelude::*;
    pub use hookscope_tracing::{TracingConfig, TracingFormat};
}
