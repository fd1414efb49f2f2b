//! Hooks system construction and scoped execution.
//!
//! [`HooksBuilder`] binds named hook factories into a [`HookTable`], returning
//! a typed [`Hook`] handle for each one. [`HooksSystem::with_instance`] makes
//! an instance active for the duration of a callback so that every hook called
//! from inside resolves against it.
//!
//! # Lifecycle of a scope
//!
//! 1. `prepare_instance` runs. An error aborts the scope before activation.
//! 2. The instance becomes active.
//! 3. The callback runs.
//! 4. `release_instance` runs, whether the callback returned or panicked.
//! 5. The slot is cleared, even if `release_instance` failed or panicked.
//! 6. A release error is returned. Otherwise the callback's value is
//!    returned, or its panic resumed.
//!
//! # Nesting
//!
//! Opening a scope inside another is governed by
//! [`ReentrancyPolicy`](crate::ReentrancyPolicy). Under the default
//! `Overwrite` policy the inner scope's exit leaves the outer scope with no
//! active instance.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::{HooksConfig, ReentrancyPolicy};
use crate::context::ActiveContext;
use crate::error::{HookError, HookRegistrationError};
use crate::hook::{Hook, HookFn};
use crate::table::HookTable;

// ─────────────────────────────────────────────────────────────────────────────
// HooksBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Registers hook factories and produces a [`HooksSystem`].
///
/// The configuration is fixed when the builder is created because every
/// handle returned by [`hook`](Self::hook) already shares the system's
/// active instance slot.
pub struct HooksBuilder<I> {
    context: Arc<ActiveContext<I>>,
    table: HookTable<I>,
}

impl<I: Send + Sync + 'static> HooksBuilder<I> {
    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn new(config: HooksConfig<I>) -> Self {
        Self {
            context: Arc::new(ActiveContext::new(config)),
            table: HookTable::default(),
        }
    }

    /// Registers a hook factory under `name` and returns its typed handle.
    ///
    /// The factory receives the active instance on every call and returns the
    /// callable to run. It is never cached: each call resolves it again.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if `name` is taken.
    pub fn hook<F, H, Args>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<Hook<I, Args, H::Output>, HookRegistrationError>
    where
        F: Fn(&Arc<I>) -> H + Send + Sync + 'static,
        H: HookFn<Args>,
        Args: 'static,
        H::Output: 'static,
    {
        let name = name.into();
        if self.table.contains(&name) {
            return Err(HookRegistrationError::DuplicateName { name });
        }

        let hook = Hook::new(
            Arc::from(name.as_str()),
            Arc::clone(&self.context),
            Arc::new(move |instance: &Arc<I>, args: Args| factory(instance).call_hook(args)),
        );
        self.table.insert(hook.clone());
        Ok(hook)
    }

    /// Returns the number of hooks registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Finishes construction.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::Empty`] if no hook was registered.
    pub fn build(self) -> Result<HooksSystem<I>, HookRegistrationError> {
        if self.table.is_empty() {
            return Err(HookRegistrationError::Empty);
        }

        tracing::debug!(hooks = ?self.table.names(), "hooks system built");

        Ok(HooksSystem {
            context: self.context,
            table: self.table,
        })
    }
}

impl<I: Send + Sync + 'static> Default for HooksBuilder<I> {
    fn default() -> Self {
        Self::new(HooksConfig::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HooksSystem
// ─────────────────────────────────────────────────────────────────────────────

/// A dispatch table of hooks bound to an implicit, scoped active instance.
///
/// # Example
///
/// ```
/// use hookscope_system::{HooksConfig, HooksSystem};
/// use std::sync::Arc;
///
/// let mut builder = HooksSystem::<u32>::with_config(
///     HooksConfig::new().with_outside_scope_message("custom"),
/// );
/// let use_something = builder
///     .hook("use_something", |_: &Arc<u32>| || 45)
///     .unwrap();
/// let system = builder.build().unwrap();
///
/// let error = use_something.call(()).unwrap_err();
/// assert_eq!(error.to_string(), "custom");
///
/// let value = system.with_instance(&Arc::new(1), || use_something.call(()));
/// assert_eq!(value.unwrap().unwrap(), 45);
/// ```
pub struct HooksSystem<I> {
    context: Arc<ActiveContext<I>>,
    table: HookTable<I>,
}

impl<I: Send + Sync + 'static> HooksSystem<I> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn builder() -> HooksBuilder<I> {
        HooksBuilder::default()
    }

    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn with_config(config: HooksConfig<I>) -> HooksBuilder<I> {
        HooksBuilder::new(config)
    }

    /// Returns the dispatch table.
    #[must_use]
    pub fn hooks(&self) -> &HookTable<I> {
        &self.table
    }

    /// Returns the system's configuration.
    #[must_use]
    pub fn config(&self) -> &HooksConfig<I> {
        self.context.config()
    }

    /// Returns `true` while a scope is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Returns the number of active scopes. Only exceeds one under
    /// [`ReentrancyPolicy::Stack`].
    #[must_use]
    pub fn depth(&self) -> usize {
        self.context.depth()
    }

    /// Returns the instance hooks currently resolve against.
    #[must_use]
    pub fn current(&self) -> Option<Arc<I>> {
        self.context.current()
    }

    /// Runs `callback` with `instance` active.
    ///
    /// The callback's value is returned untouched inside `Ok`; if it is itself
    /// a `Result`, its error is not interpreted. If the callback panics,
    /// `release_instance` still runs and the slot is still cleared. The panic
    /// then resumes with its original payload, unless `release_instance`
    /// failed, in which case its error replaces the panic.
    ///
    /// # Errors
    ///
    /// - [`HookError::AlreadyActive`] if a scope is open and the policy is
    ///   [`ReentrancyPolicy::Reject`].
    /// - [`HookError::Prepare`] if `prepare_instance` fails. The instance is
    ///   never activated and `release_instance` does not run.
    /// - [`HookError::Release`] if `release_instance` fails, whether the
    ///   callback returned or panicked. The slot is cleared regardless.
    pub fn with_instance<R>(
        &self,
        instance: &Arc<I>,
        callback: impl FnOnce() -> R,
    ) -> Result<R, HookError> {
        let config = self.context.config();

        if config.reentrancy() == ReentrancyPolicy::Reject && self.is_active() {
            return Err(HookError::AlreadyActive);
        }

        config
            .prepare(instance)
            .map_err(|source| HookError::Prepare { source })?;

        let scope = self.context.enter(Arc::clone(instance));
        // Only the slot is shared with the callback, and it is reset below.
        let outcome = panic::catch_unwind(AssertUnwindSafe(callback));
        let released = config.release(instance);
        drop(scope);

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(source)) => Err(HookError::Release { source }),
            (Err(_), Err(source)) => {
                tracing::warn!(
                    error = %source,
                    "release_instance failed, discarding callback panic"
                );
                Err(HookError::Release { source })
            }
            (Err(payload), Ok(())) => panic::resume_unwind(payload),
        }
    }
}

impl<I> fmt::Debug for HooksSystem<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksSystem")
            .field("hooks", &self.table)
            .field("config", self.context.config())
            .finish_non_exhaustive()
    }
}
