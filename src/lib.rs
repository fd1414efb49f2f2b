//! Instance-scoped hook functions for Rust.
//!
//! Hooks are registered once as factories over an instance type and called
//! later from anywhere inside [`HooksSystem::with_instance`], where they
//! resolve against whichever instance is active at that moment.
//!
//! [`HooksSystem::with_instance`]: hookscope_system::HooksSystem::with_instance

pub use hookscope_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookscope_internal::prelude::*;
}
