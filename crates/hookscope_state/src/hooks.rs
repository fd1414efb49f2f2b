//! State hook factories for [`StateHolder`] instances.
//!
//! Each factory claims the next slot of the active holder and reads or
//! initializes it. Register them on a builder from [`state_builder`], whose
//! `prepare_instance` rewinds the cursor so every scope revisits the same
//! slots in the same order.
//!
//! # Example
//!
//! ```
//! use hookscope_state::{UseState, state_builder, use_state};
//! use std::sync::Arc;
//!
//! let mut builder = state_builder();
//! let use_count: UseState<i32> = builder.hook("use_count", use_state::<i32>).unwrap();
//! let system = builder.build().unwrap();
//!
//! let holder = Arc::new(hookscope_state::StateHolder::new());
//!
//! let (count, set_count) = system
//!     .with_instance(&holder, || use_count.call((0,)))
//!     .unwrap()
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(count, 0);
//! set_count.set(99);
//!
//! let (count, _) = system
//!     .with_instance(&holder, || use_count.call((0,)))
//!     .unwrap()
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(count, 99);
//! ```

use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

use hookscope_system::{Hook, HooksBuilder, HooksConfig};

use crate::holder::{SlotError, State, StateHolder};

/// Handle returned by [`use_state`].
pub type UseState<T> = Hook<StateHolder, (T,), Result<(T, Setter<T>), SlotError>>;

/// Handle returned by [`use_ref`].
pub type UseRef<T> = Hook<StateHolder, (T,), Result<StateRef<T>, SlotError>>;

/// Handle returned by [`use_memo`].
pub type UseMemo<K, T> = Hook<StateHolder, (K, fn(&K) -> T), Result<T, SlotError>>;

// ─────────────────────────────────────────────────────────────────────────────
// Setter
// ─────────────────────────────────────────────────────────────────────────────

/// Writes one slot of one holder. Remains usable after the scope ends.
pub struct Setter<T> {
    holder: Arc<StateHolder>,
    index: usize,
    _value: PhantomData<fn(T)>,
}

impl<T: State> Setter<T> {
    fn new(holder: Arc<StateHolder>, index: usize) -> Self {
        Self {
            holder,
            index,
            _value: PhantomData,
        }
    }

    /// Replaces the slot's value. The next scope will read it.
    pub fn set(&self, value: T) {
        self.holder.set(self.index, value);
    }

    /// Returns the slot this setter writes.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            holder: Arc::clone(&self.holder),
            index: self.index,
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("index", &self.index).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StateRef
// ─────────────────────────────────────────────────────────────────────────────

/// A mutable cell over one slot, read and written without re-rendering.
pub struct StateRef<T> {
    holder: Arc<StateHolder>,
    index: usize,
    _value: PhantomData<fn() -> T>,
}

impl<T: State> StateRef<T> {
    /// Returns the slot's current value.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the slot was cleared or overwritten with
    /// another type.
    pub fn get(&self) -> Result<T, SlotError> {
        self.holder
            .get(self.index)?
            .ok_or(SlotError::Empty { index: self.index })
    }

    /// Replaces the slot's value.
    pub fn set(&self, value: T) {
        self.holder.set(self.index, value);
    }

    /// Modifies the slot's value in place.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the slot was cleared or overwritten with
    /// another type.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), SlotError> {
        self.holder.update(self.index, f)
    }
}

impl<T> Clone for StateRef<T> {
    fn clone(&self) -> Self {
        Self {
            holder: Arc::clone(&self.holder),
            index: self.index,
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRef").field("index", &self.index).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Factories
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration that rewinds the holder's cursor at the start of every scope.
#[must_use]
pub fn state_config() -> HooksConfig<StateHolder> {
    HooksConfig::new().with_prepare_instance(|holder: &StateHolder| {
        holder.reset_cursor();
        Ok(())
    })
}

/// A builder preconfigured with [`state_config`].
#[must_use]
pub fn state_builder() -> HooksBuilder<StateHolder> {
    HooksBuilder::new(state_config())
}

/// Claims the next slot and returns its value, initialized to the argument on
/// first use, together with a [`Setter`] for it.
pub fn use_state<T: State>(
    holder: &Arc<StateHolder>,
) -> impl FnOnce(T) -> Result<(T, Setter<T>), SlotError> + use<T> {
    let holder = Arc::clone(holder);
    move |initial: T| {
        let index = holder.advance();
        let value = holder.get_or_init(index, initial)?;
        Ok((value, Setter::new(holder, index)))
    }
}

/// Claims the next slot and returns a [`StateRef`] over it, initialized to the
/// argument on first use.
pub fn use_ref<T: State>(
    holder: &Arc<StateHolder>,
) -> impl FnOnce(T) -> Result<StateRef<T>, SlotError> + use<T> {
    let holder = Arc::clone(holder);
    move |initial: T| {
        let index = holder.advance();
        holder.get_or_init(index, initial)?;
        Ok(StateRef {
            holder,
            index,
            _value: PhantomData,
        })
    }
}

#[derive(Clone)]
struct Memo<K, T> {
    key: K,
    value: T,
}

/// Claims the next slot and returns `compute(&key)`, reusing the stored value
/// while `key` is unchanged.
pub fn use_memo<K, T>(
    holder: &Arc<StateHolder>,
) -> impl FnOnce(K, fn(&K) -> T) -> Result<T, SlotError> + use<K, T>
where
    K: State + PartialEq,
    T: State,
{
    let holder = Arc::clone(holder);
    move |key: K, compute: fn(&K) -> T| {
        let index = holder.advance();
        if let Some(memo) = holder.get::<Memo<K, T>>(index)?
            && memo.key == key
        {
            return Ok(memo.value);
        }

        // Computed outside the holder's lock so `compute` may touch the holder.
        let value = compute(&key);
        holder.set(
            index,
            Memo {
                key,
                value: value.clone(),
            },
        );
        Ok(value)
    }
}
