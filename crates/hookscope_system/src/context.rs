//! The active instance slot.
//!
//! [`ActiveContext`] is shared between a [`HooksSystem`](crate::HooksSystem)
//! and every [`Hook`](crate::Hook) handle it produced. The system is the only
//! writer: it activates an instance through [`ActiveContext::enter`] and the
//! returned [`ScopeGuard`] deactivates it when dropped, on every exit path.
//! Hooks only read the top of the slot.
//!
//! The slot lock is held for the read or write itself and never while user
//! code runs, so hooks can freely call other hooks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{HooksConfig, ReentrancyPolicy};
use crate::error::HookError;

/// Slot holding the currently active instance, shared by a system and its hooks.
pub(crate) struct ActiveContext<I> {
    /// Active instances. At most one entry unless the policy is
    /// [`ReentrancyPolicy::Stack`].
    slot: Mutex<Vec<Arc<I>>>,
    config: HooksConfig<I>,
}

impl<I> ActiveContext<I> {
    pub(crate) fn new(config: HooksConfig<I>) -> Self {
        Self {
            slot: Mutex::new(Vec::new()),
            config,
        }
    }

    pub(crate) fn config(&self) -> &HooksConfig<I> {
        &self.config
    }

    /// Returns the instance hooks currently resolve against.
    pub(crate) fn current(&self) -> Option<Arc<I>> {
        self.slot.lock().last().cloned()
    }

    /// Returns the active instance or the configured `NoActiveInstance` error.
    pub(crate) fn require(&self, hook: &str) -> Result<Arc<I>, HookError> {
        self.current().ok_or_else(|| {
            tracing::debug!(hook, "hook called with no active instance");
            HookError::NoActiveInstance {
                message: self.config.outside_scope_message().to_owned(),
            }
        })
    }

    pub(crate) fn depth(&self) -> usize {
        self.slot.lock().len()
    }

    /// Makes `instance` visible to hooks until the returned guard is dropped.
    ///
    /// Under [`ReentrancyPolicy::Reject`] the caller must have checked
    /// [`depth`](Self::depth) before running `prepare_instance`.
    pub(crate) fn enter(&self, instance: Arc<I>) -> ScopeGuard<'_, I> {
        let policy = self.config.reentrancy();
        let mut slot = self.slot.lock();
        match policy {
            ReentrancyPolicy::Overwrite | ReentrancyPolicy::Reject => {
                slot.clear();
                slot.push(instance);
            }
            ReentrancyPolicy::Stack => slot.push(instance),
        }
        tracing::trace!(depth = slot.len(), ?policy, "instance activated");
        ScopeGuard { context: self }
    }

    fn exit(&self) {
        let policy = self.config.reentrancy();
        let mut slot = self.slot.lock();
        match policy {
            ReentrancyPolicy::Overwrite | ReentrancyPolicy::Reject => slot.clear(),
            ReentrancyPolicy::Stack => {
                slot.pop();
            }
        }
        tracing::trace!(depth = slot.len(), ?policy, "instance deactivated");
    }
}

/// Deactivates the scope's instance when dropped.
pub(crate) struct ScopeGuard<'a, I> {
    context: &'a ActiveContext<I>,
}

impl<I> Drop for ScopeGuard<'_, I> {
    fn drop(&mut self) {
        self.context.exit();
    }
}
