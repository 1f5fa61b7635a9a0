//! Ambient context slot.
//!
//! One slot per thread holds the context currently in effect. The slot only changes
//! through [`run_with_context`], which puts the previous value back when the closure
//! returns or unwinds, so nested calls form a stack even though only the top is stored.

use super::Context;
use crate::error::ContextError;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static CURRENT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// Guard that installs a context and restores the previous slot value on drop.
///
/// Private to this module: guards are only created and dropped in strict LIFO order
/// by [`run_with_context`]. Not `Send`: the restore must happen on the thread whose
/// slot was changed.
struct ContextScope {
    installed: Context,
    previous: Option<Context>,
    _thread_bound: PhantomData<*const ()>,
}

impl ContextScope {
    fn enter(context: Context) -> Self {
        let previous = CURRENT.with(|slot| slot.borrow_mut().replace(context.clone()));
        Self {
            installed: context,
            previous,
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let in_order = CURRENT.with(|slot| {
            let in_order = slot
                .borrow()
                .as_ref()
                .is_some_and(|current| current.ptr_eq(&self.installed));
            *slot.borrow_mut() = previous;
            in_order
        });
        debug_assert!(
            in_order || std::thread::panicking(),
            "context scopes dropped out of order"
        );
    }
}

/// Run `f` with `context` installed. The previous context is restored when `f`
/// returns or unwinds.
pub fn run_with_context<R>(context: &Context, f: impl FnOnce() -> R) -> R {
    let _scope = ContextScope::enter(context.clone());
    f()
}

/// The context currently in effect on this thread.
pub fn current_context() -> Result<Context, ContextError> {
    CURRENT
        .with(|slot| slot.borrow().clone())
        .ok_or(ContextError::Missing)
}

/// Whether any context is installed on this thread.
pub fn has_context() -> bool {
    CURRENT.with(|slot| slot.borrow().is_some())
}
