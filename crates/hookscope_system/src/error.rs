//! Error types for hook registration, lookup, and scoped execution.

use thiserror::Error;

/// Boxed error returned by lifecycle callbacks.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Message used when a hook is called outside of
/// [`with_instance`](crate::HooksSystem::with_instance) and no custom message
/// was configured.
pub const DEFAULT_OUTSIDE_SCOPE_MESSAGE: &str =
    "Attempted to use a hook function, but there was no active instance.";

/// Errors surfaced while running hooks or scopes.
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook was called while no instance was active.
    ///
    /// The message is either the configured
    /// [`outside_scope_message`](crate::HooksConfig::with_outside_scope_message)
    /// or [`DEFAULT_OUTSIDE_SCOPE_MESSAGE`].
    #[error("{message}")]
    NoActiveInstance {
        /// The configured or default message.
        message: String,
    },

    /// A scope was opened while another one was active under
    /// [`ReentrancyPolicy::Reject`](crate::ReentrancyPolicy::Reject).
    #[error("an instance is already active; nested scopes are rejected")]
    AlreadyActive,

    /// The `prepare_instance` callback failed. The slot was never set.
    #[error("prepare_instance failed: {source}")]
    Prepare {
        /// Error returned by the callback.
        source: BoxError,
    },

    /// The `release_instance` callback failed. The slot was still cleared.
    #[error("release_instance failed: {source}")]
    Release {
        /// Error returned by the callback.
        source: BoxError,
    },

    /// A by-name call could not find a matching hook.
    #[error(transparent)]
    Lookup(#[from] HookLookupError),
}

impl HookError {
    /// Returns `true` if this is a [`NoActiveInstance`](Self::NoActiveInstance) error.
    #[must_use]
    pub fn is_no_active_instance(&self) -> bool {
        matches!(self, Self::NoActiveInstance { .. })
    }
}

/// Errors that can occur while building a hooks system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookRegistrationError {
    /// A hook with this name was already registered.
    #[error("hook '{name}' already registered")]
    DuplicateName {
        /// The duplicate hook name.
        name: String,
    },

    /// `build()` was called without any registered hooks.
    #[error("a hooks system needs at least one hook")]
    Empty,
}

/// Errors returned when retrieving a typed hook from a [`HookTable`](crate::HookTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookLookupError {
    /// No hook is registered under this name.
    #[error("hook '{name}' not found")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// The hook exists but was registered with a different signature.
    #[error("hook '{name}' is registered as {registered}, requested as {requested}")]
    SignatureMismatch {
        /// The requested name.
        name: String,
        /// Signature the hook was registered with.
        registered: String,
        /// Signature the caller asked for.
        requested: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_instance_displays_message_verbatim() {
        let error = HookError::NoActiveInstance {
            message: "custom".into(),
        };
        assert_eq!(error.to_string(), "custom");
        assert!(error.is_no_active_instance());
    }

    #[test]
    fn lifecycle_errors_expose_source() {
        let error = HookError::Release {
            source: "disk full".into(),
        };
        let source = core::error::Error::source(&error).expect("source should be set");
        assert_eq!(source.to_string(), "disk full");
        assert!(!error.is_no_active_instance());
    }

    #[test]
    fn lookup_error_is_transparent() {
        let error = HookError::from(HookLookupError::NotFound {
            name: "use_state".into(),
        });
        assert_eq!(error.to_string(), "hook 'use_state' not found");
    }
}
