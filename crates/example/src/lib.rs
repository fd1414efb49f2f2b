//! Example component renderer.
//!
//! Each [`Counter`] owns a [`StateHolder`]. Rendering a counter opens a scope
//! for its holder and calls three state hooks in a fixed order:
//!
//! 1. `use_count` - the current count and a setter for it
//! 2. `use_renders` - how many times the counter has been rendered
//! 3. `use_parity` - "even" or "odd", recomputed only when the count changes

use std::sync::Arc;

use hookscope_state::{
    Setter, SlotError, StateHolder, UseMemo, UseRef, UseState, state_config, use_memo, use_ref,
    use_state,
};
use hookscope_system::{HookError, HookRegistrationError, HooksSystem};

/// Errors that can occur while rendering a component.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The hooks system refused the call or a lifecycle callback failed.
    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    /// A state slot could not be read.
    #[error("state error: {0}")]
    Slot(#[from] SlotError),
}

/// A stateful counter component.
#[derive(Debug)]
pub struct Counter {
    label: String,
    holder: Arc<StateHolder>,
}

impl Counter {
    /// Creates a counter with fresh state.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            holder: Arc::new(StateHolder::new()),
        }
    }

    /// Returns the counter's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Output of one render.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Label of the rendered counter.
    pub label: String,
    /// Count at render time.
    pub count: i64,
    /// Number of renders so far, including this one.
    pub renders: u32,
    /// Parity of `count`.
    pub parity: &'static str,
    /// Updates the count seen by the next render.
    pub set_count: Setter<i64>,
}

impl Frame {
    /// Requests `count + 1` for the next render.
    pub fn increment(&self) {
        self.set_count.set(self.count + 1);
    }
}

/// The hooks used by [`Counter`] components.
#[derive(Debug, Clone)]
pub struct CounterHooks {
    use_count: UseState<i64>,
    use_renders: UseRef<u32>,
    use_parity: UseMemo<i64, &'static str>,
}

/// Renders counters against a shared hooks system.
#[derive(Debug)]
pub struct Renderer {
    system: HooksSystem<StateHolder>,
    hooks: CounterHooks,
}

fn parity(count: &i64) -> &'static str {
    if count % 2 == 0 { "even" } else { "odd" }
}

impl Renderer {
    /// Builds the hooks system.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError`] if the hooks cannot be registered.
    pub fn new() -> Result<Self, HookRegistrationError> {
        let mut builder = HooksSystem::with_config(
            state_config()
                .with_release_instance(|holder: &StateHolder| {
                    tracing::debug!(slots = holder.len(), "render finished");
                    Ok(())
                })
                .with_outside_scope_message("counter hooks can only be called while rendering"),
        );

        let hooks = CounterHooks {
            use_count: builder.hook("use_count", use_state::<i64>)?,
            use_renders: builder.hook("use_renders", use_ref::<u32>)?,
            use_parity: builder.hook("use_parity", use_memo::<i64, &'static str>)?,
        };

        Ok(Self {
            system: builder.build()?,
            hooks,
        })
    }

    /// Returns the hook handles, e.g. to demonstrate calls outside a render.
    #[must_use]
    pub fn hooks(&self) -> &CounterHooks {
        &self.hooks
    }

    /// Renders `counter` once.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a hook fails.
    pub fn render(&self, counter: &Counter) -> Result<Frame, RenderError> {
        let hooks = &self.hooks;
        self.system.with_instance(&counter.holder, || -> Result<Frame, RenderError> {
            let (count, set_count) = hooks.use_count.call((0,))??;

            let renders = hooks.use_renders.call((0,))??;
            renders.update(|renders| *renders += 1)?;

            let parity = hooks.use_parity.call((count, parity))??;

            Ok(Frame {
                label: counter.label.clone(),
                count,
                renders: renders.get()?,
                parity,
                set_count,
            })
        })?
    }
}

impl CounterHooks {
    /// Reads the count. Only succeeds while a render is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NoActiveInstance`] outside of a render.
    pub fn peek_count(&self) -> Result<i64, RenderError> {
        let (count, _) = self.use_count.call((0,))??;
        Ok(count)
    }
}
