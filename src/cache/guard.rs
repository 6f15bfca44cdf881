//! Guard Module
//!
//! Exclusive-access strategies wrapping the store's mutable state.

use std::cell::RefCell;

use parking_lot::Mutex;

// == Guard ==
/// Runs closures with exclusive access to a wrapped value.
///
/// The strategy is picked at construction through the store's type parameter,
/// so the hot path never branches on whether a lock exists.
pub trait Guard {
    /// Container holding the guarded value.
    type Cell<T>;

    /// Wraps a value.
    fn wrap<T>(value: T) -> Self::Cell<T>;

    /// Runs `f` with exclusive access to the wrapped value.
    fn run<T, R>(cell: &Self::Cell<T>, f: impl FnOnce(&mut T) -> R) -> R;
}

// == Concurrent ==
/// Mutual exclusion through a `parking_lot::Mutex`; the store is `Sync`.
#[derive(Debug)]
pub enum Concurrent {}

impl Guard for Concurrent {
    type Cell<T> = Mutex<T>;

    fn wrap<T>(value: T) -> Mutex<T> {
        Mutex::new(value)
    }

    fn run<T, R>(cell: &Mutex<T>, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut cell.lock())
    }
}

// == Single Threaded ==
/// No locking. The store is `!Sync`, so it cannot be shared across threads.
#[derive(Debug)]
pub enum SingleThreaded {}

impl Guard for SingleThreaded {
    type Cell<T> = RefCell<T>;

    fn wrap<T>(value: T) -> RefCell<T> {
        RefCell::new(value)
    }

    fn run<T, R>(cell: &RefCell<T>, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut cell.borrow_mut())
    }
}
