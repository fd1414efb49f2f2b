//! Context-resolving hook handles.
//!
//! A hook factory maps an instance to a callable. [`Hook`] wraps such a
//! factory together with the shared active instance slot: calling it looks up
//! the active instance, resolves the factory against it, and forwards the
//! arguments and return value unchanged.
//!
//! Callables of up to eight arguments are supported through [`HookFn`].
//! Arguments are passed to [`Hook::call`] as a tuple.

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use variadics_please::all_tuples;

use crate::context::ActiveContext;
use crate::error::HookError;

/// A callable produced by a hook factory.
///
/// Implemented for every `FnOnce` closure of up to eight arguments, with
/// `Args` being the tuple of its argument types. Users never implement this
/// trait directly.
pub trait HookFn<Args> {
    /// The value returned by the callable.
    type Output;

    /// Invokes the callable with a tuple of arguments.
    fn call_hook(self, args: Args) -> Self::Output;
}

macro_rules! impl_hook_fn {
    ($(($arg:ident, $value:ident)),*) => {
        impl<Func, Out, $($arg),*> HookFn<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Out,
        {
            type Output = Out;

            fn call_hook(self, ($($value,)*): ($($arg,)*)) -> Out {
                self($($value),*)
            }
        }
    };
}

// Generate impls for callables of 0 to 8 arguments
all_tuples!(impl_hook_fn, 0, 8, A, a);

/// Type-erased factory resolution: instance plus arguments to result.
pub(crate) type Resolver<I, Args, R> = Arc<dyn Fn(&Arc<I>, Args) -> R + Send + Sync>;

/// A context-transparent hook callable.
///
/// Obtained from [`HooksBuilder::hook`](crate::HooksBuilder::hook) or
/// [`HookTable::get`](crate::HookTable::get). Cloning is cheap; every clone
/// resolves against the same system's active instance.
///
/// # Example
///
/// ```
/// use hookscope_system::HooksSystem;
/// use std::sync::Arc;
///
/// struct Request {
///     path: String,
/// }
///
/// let mut builder = HooksSystem::<Request>::builder();
/// let use_path = builder
///     .hook("use_path", |request: &Arc<Request>| {
///         let request = Arc::clone(request);
///         move || request.path.clone()
///     })
///     .unwrap();
/// let system = builder.build().unwrap();
///
/// // No active instance yet
/// assert!(use_path.call(()).is_err());
///
/// let request = Arc::new(Request { path: "/index".into() });
/// let path = system.with_instance(&request, || use_path.call(())).unwrap();
/// assert_eq!(path.unwrap(), "/index");
/// ```
pub struct Hook<I, Args, R> {
    name: Arc<str>,
    context: Arc<ActiveContext<I>>,
    resolve: Resolver<I, Args, R>,
    _signature: PhantomData<fn(Args) -> R>,
}

impl<I, Args, R> Hook<I, Args, R> {
    pub(crate) fn new(
        name: Arc<str>,
        context: Arc<ActiveContext<I>>,
        resolve: Resolver<I, Args, R>,
    ) -> Self {
        Self {
            name,
            context,
            resolve,
            _signature: PhantomData,
        }
    }

    /// Returns the name the hook was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the hook against the active instance.
    ///
    /// The factory is resolved afresh on every call. Its result is returned
    /// as-is; a panic inside the hook propagates to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NoActiveInstance`] if no instance is active.
    pub fn call(&self, args: Args) -> Result<R, HookError> {
        let instance = self.context.require(&self.name)?;
        Ok((self.resolve)(&instance, args))
    }
}

impl<I, Args, R> Clone for Hook<I, Args, R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            context: Arc::clone(&self.context),
            resolve: Arc::clone(&self.resolve),
            _signature: PhantomData,
        }
    }
}

impl<I, Args, R> fmt::Debug for Hook<I, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("signature", &signature::<Args, R>())
            .finish_non_exhaustive()
    }
}

/// Human-readable signature used in lookup errors and debug output.
pub(crate) fn signature<Args, R>() -> String {
    format!("fn{} -> {}", type_name::<Args>(), type_name::<R>())
}
