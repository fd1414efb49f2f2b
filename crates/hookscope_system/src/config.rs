//! Configuration for a hooks system.
//!
//! [`HooksConfig`] carries the optional lifecycle callbacks run around every
//! [`with_instance`](crate::HooksSystem::with_instance) call, the message used
//! when a hook is called outside of a scope, and the [`ReentrancyPolicy`].
//!
//! # Example
//!
//! ```
//! use hookscope_system::{HooksConfig, ReentrancyPolicy};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Component {
//!     cursor: AtomicUsize,
//! }
//!
//! let config = HooksConfig::<Component>::default()
//!     .with_prepare_instance(|component| {
//!         component.cursor.store(0, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .with_outside_scope_message("hooks may only be called while rendering")
//!     .with_reentrancy(ReentrancyPolicy::Reject);
//!
//! assert_eq!(config.reentrancy(), ReentrancyPolicy::Reject);
//! ```

use core::fmt;
use std::sync::Arc;

use crate::error::{BoxError, DEFAULT_OUTSIDE_SCOPE_MESSAGE};

/// Callback run when an instance is activated or released.
pub type LifecycleFn<I> = Arc<dyn Fn(&I) -> Result<(), BoxError> + Send + Sync>;

/// What happens when a scope is opened while another is still active.
///
/// Nested scopes are outside the intended usage model. The default keeps the
/// single-slot semantics; the other variants either refuse nesting or make it
/// well-defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReentrancyPolicy {
    /// The inner scope replaces the active instance, and its exit clears the
    /// slot entirely. Hooks called later in the outer scope fail with
    /// [`HookError::NoActiveInstance`](crate::HookError::NoActiveInstance).
    #[default]
    Overwrite,
    /// Opening a nested scope fails with
    /// [`HookError::AlreadyActive`](crate::HookError::AlreadyActive) before
    /// `prepare_instance` runs.
    Reject,
    /// Active instances form a stack. The inner scope's exit restores the
    /// outer instance.
    Stack,
}

/// Immutable configuration of a [`HooksSystem`](crate::HooksSystem).
pub struct HooksConfig<I> {
    /// Runs before the instance becomes visible to hooks.
    prepare_instance: Option<LifecycleFn<I>>,
    /// Runs after the callback, before the slot is cleared.
    release_instance: Option<LifecycleFn<I>>,
    /// Overrides [`DEFAULT_OUTSIDE_SCOPE_MESSAGE`].
    outside_scope_message: Option<String>,
    reentrancy: ReentrancyPolicy,
}

impl<I> Default for HooksConfig<I> {
    fn default() -> Self {
        Self {
            prepare_instance: None,
            release_instance: None,
            outside_scope_message: None,
            reentrancy: ReentrancyPolicy::default(),
        }
    }
}

impl<I> Clone for HooksConfig<I> {
    fn clone(&self) -> Self {
        Self {
            prepare_instance: self.prepare_instance.clone(),
            release_instance: self.release_instance.clone(),
            outside_scope_message: self.outside_scope_message.clone(),
            reentrancy: self.reentrancy,
        }
    }
}

impl<I> fmt::Debug for HooksConfig<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksConfig")
            .field("prepare_instance", &self.prepare_instance.is_some())
            .field("release_instance", &self.release_instance.is_some())
            .field("outside_scope_message", &self.outside_scope_message)
            .field("reentrancy", &self.reentrancy)
            .finish()
    }
}

impl<I> HooksConfig<I> {
    /// Creates a configuration with no callbacks and the default message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback run once per scope, before the instance is activated.
    ///
    /// An error aborts the scope: the slot is never set and the release
    /// callback does not run.
    #[must_use]
    pub fn with_prepare_instance(
        mut self,
        prepare: impl Fn(&I) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.prepare_instance = Some(Arc::new(prepare));
        self
    }

    /// Sets the callback run once per scope, after the callback completes
    /// (normally or by panicking) and before the slot is cleared.
    #[must_use]
    pub fn with_release_instance(
        mut self,
        release: impl Fn(&I) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.release_instance = Some(Arc::new(release));
        self
    }

    /// Sets the message reported when a hook is called with no active instance.
    ///
    /// An empty message keeps the default.
    #[must_use]
    pub fn with_outside_scope_message(mut self, message: impl Into<String>) -> Self {
        self.outside_scope_message = Some(message.into());
        self
    }

    /// Sets the policy for nested scopes.
    #[must_use]
    pub fn with_reentrancy(mut self, policy: ReentrancyPolicy) -> Self {
        self.reentrancy = policy;
        self
    }

    /// Returns the message reported by hooks called outside of a scope.
    #[must_use]
    pub fn outside_scope_message(&self) -> &str {
        self.outside_scope_message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(DEFAULT_OUTSIDE_SCOPE_MESSAGE)
    }

    /// Returns the configured reentrancy policy.
    #[must_use]
    pub fn reentrancy(&self) -> ReentrancyPolicy {
        self.reentrancy
    }

    pub(crate) fn prepare(&self, instance: &I) -> Result<(), BoxError> {
        match &self.prepare_instance {
            Some(prepare) => prepare(instance),
            None => Ok(()),
        }
    }

    pub(crate) fn release(&self, instance: &I) -> Result<(), BoxError> {
        match &self.release_instance {
            Some(release) => release(instance),
            None => Ok(()),
        }
    }
}
