//! The hook dispatch table.
//!
//! [`HookTable`] maps every registered hook name to its context-resolving
//! callable. It is built once by [`HooksBuilder`](crate::HooksBuilder) and is
//! immutable afterwards: the keys are exactly the names that were registered.
//!
//! Entries are stored type-erased and recovered as typed [`Hook`] handles by
//! [`HookTable::get`]. Asking for the wrong signature is reported as
//! [`HookLookupError::SignatureMismatch`] rather than panicking.

use core::any::Any;
use core::fmt;

use hashbrown::HashMap;

use crate::error::{HookError, HookLookupError};
use crate::hook::{Hook, signature};

// ─────────────────────────────────────────────────────────────────────────────
// HookEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in the dispatch table.
struct HookEntry {
    /// A `Hook<I, Args, R>` behind `dyn Any`.
    hook: Box<dyn Any + Send + Sync>,
    /// Signature the hook was registered with, for error reporting.
    signature: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// HookTable
// ─────────────────────────────────────────────────────────────────────────────

/// Name-keyed dispatch table of context-resolving hooks.
pub struct HookTable<I> {
    entries: HashMap<String, HookEntry>,
    _instance: core::marker::PhantomData<fn(&I)>,
}

impl<I> Default for HookTable<I> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            _instance: core::marker::PhantomData,
        }
    }
}

impl<I> HookTable<I> {
    /// Returns the number of hooks in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks if a hook with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns all hook names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the registered signature of a hook, if present.
    #[must_use]
    pub fn signature_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.signature.as_str())
    }
}

impl<I: Send + Sync + 'static> HookTable<I> {
    /// Inserts a hook. The caller guarantees the name is not yet taken.
    pub(crate) fn insert<Args, R>(&mut self, hook: Hook<I, Args, R>)
    where
        Args: 'static,
        R: 'static,
    {
        let name = hook.name().to_owned();
        let entry = HookEntry {
            signature: signature::<Args, R>(),
            hook: Box::new(hook),
        };
        self.entries.insert(name, entry);
    }

    /// Retrieves a typed handle for the named hook.
    ///
    /// # Errors
    ///
    /// - [`HookLookupError::NotFound`] if no hook has this name.
    /// - [`HookLookupError::SignatureMismatch`] if `Args`/`R` differ from the
    ///   registered signature.
    pub fn get<Args, R>(&self, name: &str) -> Result<Hook<I, Args, R>, HookLookupError>
    where
        Args: 'static,
        R: 'static,
    {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| HookLookupError::NotFound {
                name: name.to_owned(),
            })?;

        entry
            .hook
            .downcast_ref::<Hook<I, Args, R>>()
            .cloned()
            .ok_or_else(|| HookLookupError::SignatureMismatch {
                name: name.to_owned(),
                registered: entry.signature.clone(),
                requested: signature::<Args, R>(),
            })
    }

    /// Looks up a hook by name and calls it against the active instance.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Lookup`] if the name or signature does not match,
    /// and [`HookError::NoActiveInstance`] if no instance is active.
    pub fn call<Args, R>(&self, name: &str, args: Args) -> Result<R, HookError>
    where
        Args: 'static,
        R: 'static,
    {
        self.get::<Args, R>(name)?.call(args)
    }
}

impl<I> fmt::Debug for HookTable<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.names() {
            map.entry(&name, &self.entries[name].signature);
        }
        map.finish()
    }
}
