//! Change notification for model entities.
//!
//! Every entity is constructed with a [`ChangeHook`]. Setters compare the
//! old and new value, assign, and fire the hook only on an actual change, so
//! a caller wiring one hook into a whole project gets exact dirty tracking
//! for free.

use std::fmt;
use std::rc::Rc;

/// Callback handle fired whenever an entity field actually changes.
///
/// Cloning is cheap; all clones share the same callback.
#[derive(Clone, Default)]
pub struct ChangeHook(Option<Rc<dyn Fn()>>);

impl ChangeHook {
    /// A hook that ignores notifications.
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps a callback to be fired on every actual field change.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self(Some(Rc::new(callback)))
    }

    /// Fires the callback, if one is set.
    pub fn notify(&self) {
        if let Some(callback) = &self.0 {
            callback();
        }
    }
}

impl fmt::Debug for ChangeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_some() {
            f.write_str("ChangeHook(set)")
        } else {
            f.write_str("ChangeHook(none)")
        }
    }
}

/// Assigns `value` to `slot` and notifies `hook` only if the value changed.
pub(crate) fn set_field<T: PartialEq>(slot: &mut T, value: T, hook: &ChangeHook) {
    if *slot != value {
        *slot = value;
        hook.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_hook() -> (ChangeHook, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let hook = ChangeHook::new(move || counter.set(counter.get() + 1));
        (hook, count)
    }

    #[test]
    fn set_field_notifies_only_on_actual_change() {
        let (hook, count) = counting_hook();
        let mut value = Some("draft".to_string());

        set_field(&mut value, Some("draft".to_string()), &hook);
        assert_eq!(count.get(), 0);

        set_field(&mut value, Some("final".to_string()), &hook);
        assert_eq!(count.get(), 1);

        set_field(&mut value, None, &hook);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn default_hook_is_silent() {
        let hook = ChangeHook::none();
        hook.notify();
        let mut value = 1;
        set_field(&mut value, 2, &hook);
        assert_eq!(value, 2);
    }
}
