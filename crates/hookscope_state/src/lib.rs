//! Slot-indexed state hooks (Layer 2).
//!
//! `hookscope_state` supplies an instance type and hook factories for
//! component-style state on top of [`hookscope_system`]:
//!
//! - [`StateHolder`] - Slot-indexed storage with a call-order cursor
//! - [`use_state`] - Value plus [`Setter`], initialized on first use
//! - [`use_ref`] - Mutable [`StateRef`] cell over a slot
//! - [`use_memo`] - Cached computation keyed by an argument
//! - [`state_builder`] - Builder whose scopes rewind the cursor
//!
//! Slot identity is call order: a scope must call its state hooks in the same
//! order every time, or reads fail with [`SlotError::TypeMismatch`] (or
//! silently read a neighbour's slot of the same type).

mod holder;
mod hooks;

pub use holder::{SlotError, State, StateHolder};
pub use hooks::{
    Setter, StateRef, UseMemo, UseRef, UseState, state_builder, state_config, use_memo, use_ref,
    use_state,
};
