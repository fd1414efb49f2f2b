//! Slot-indexed state storage.
//!
//! A [`StateHolder`] is the instance type for state hooks: a map from slot
//! index to a type-erased value, plus a cursor naming the next slot to claim.
//! Hooks claim slots in call order, so the order in which a scope calls its
//! hooks decides which slot each call reads. Resetting the cursor at the start
//! of every scope makes repeated scopes line up with the same slots.

use core::any::{Any, type_name};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;

/// A value that can be kept in a state slot.
///
/// Any type that is `Clone + Send + Sync + 'static` automatically implements
/// `State`. Reads hand out clones, so the holder never lends references across
/// a scope boundary.
pub trait State: Clone + Send + Sync + 'static {}

// Blanket implementation for all compatible types
impl<T: Clone + Send + Sync + 'static> State for T {}

/// Errors that can occur while reading or writing a state slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The slot holds a value of a different type. This usually means hooks
    /// were called in a different order than in a previous scope.
    #[error("state slot {index} does not hold a {expected}")]
    TypeMismatch {
        /// The slot that was read.
        index: usize,
        /// The type the caller asked for.
        expected: &'static str,
    },

    /// The slot has never been written.
    #[error("state slot {index} is empty")]
    Empty {
        /// The slot that was read.
        index: usize,
    },
}

/// Slot-indexed state for one hook instance.
///
/// # Example
///
/// ```
/// use hookscope_state::StateHolder;
///
/// let holder = StateHolder::new();
///
/// let slot = holder.advance();
/// assert_eq!(holder.get_or_init(slot, 0_i32).unwrap(), 0);
///
/// holder.set(slot, 99_i32);
/// holder.reset_cursor();
///
/// let slot = holder.advance();
/// assert_eq!(holder.get_or_init(slot, 0_i32).unwrap(), 99);
/// ```
#[derive(Default)]
pub struct StateHolder {
    slots: RwLock<HashMap<usize, Box<dyn Any + Send + Sync>>>,
    cursor: AtomicUsize,
}

impl StateHolder {
    /// Creates an empty holder with the cursor at slot 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the next slot to be claimed.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Claims the slot under the cursor and moves the cursor forward.
    ///
    /// Returns the claimed slot's index.
    pub fn advance(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::SeqCst)
    }

    /// Moves the cursor back to slot 0 without touching stored values.
    pub fn reset_cursor(&self) {
        self.cursor.store(0, Ordering::SeqCst);
    }

    /// Returns the value in `index`, storing `initial` first if the slot is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::TypeMismatch`] if the slot holds another type.
    pub fn get_or_init<T: State>(&self, index: usize, initial: T) -> Result<T, SlotError> {
        let mut slots = self.slots.write();
        let value = slots
            .entry(index)
            .or_insert_with(|| Box::new(initial) as Box<dyn Any + Send + Sync>);
        downcast(index, &**value)
    }

    /// Returns a clone of the value in `index`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::TypeMismatch`] if the slot holds another type.
    pub fn get<T: State>(&self, index: usize) -> Result<Option<T>, SlotError> {
        let slots = self.slots.read();
        slots
            .get(&index)
            .map(|value| downcast(index, &**value))
            .transpose()
    }

    /// Stores `value` in `index`, replacing whatever was there.
    pub fn set<T: State>(&self, index: usize, value: T) {
        self.slots.write().insert(index, Box::new(value));
    }

    /// Modifies the value in `index` in place.
    ///
    /// `f` runs under the holder's write lock and must not access the holder.
    ///
    /// # Errors
    ///
    /// - [`SlotError::Empty`] if the slot was never written.
    /// - [`SlotError::TypeMismatch`] if the slot holds another type.
    pub fn update<T: State>(&self, index: usize, f: impl FnOnce(&mut T)) -> Result<(), SlotError> {
        let mut slots = self.slots.write();
        let value = slots.get_mut(&index).ok_or(SlotError::Empty { index })?;
        let value = value
            .downcast_mut::<T>()
            .ok_or(SlotError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })?;
        f(value);
        Ok(())
    }

    /// Returns the number of written slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns `true` if no slot has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Drops every stored value and resets the cursor.
    pub fn clear(&self) {
        self.slots.write().clear();
        self.reset_cursor();
    }
}

impl fmt::Debug for StateHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHolder")
            .field("slots", &self.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}

fn downcast<T: State>(index: usize, value: &(dyn Any + Send + Sync)) -> Result<T, SlotError> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or(SlotError::TypeMismatch {
            index,
            expected: type_name::<T>(),
        })
}
