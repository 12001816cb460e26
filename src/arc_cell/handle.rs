//! `AtomicArc<T>`: an ergonomic, allocating wrapper over the bare
//! [`ArcCell`]. The cell itself never allocates or frees anything — this
//! module is where `Box` enters the picture, grounded on the
//! producer/consumer ergonomic wrappers `kaos` layers over its raw
//! disruptor core.

use std::marker::PhantomData;
use std::ops::Deref;

use super::cell::{ArcCell, Held};
use super::control_block::ControlBlock;

unsafe fn destroy_data<T>(ctx: *mut ()) {
    drop(Box::from_raw(ctx as *mut T));
}

fn release_pair<T>(block: *const ControlBlock, data: *mut T) {
    // SAFETY: every pointer passed here came from a `Box::into_raw` pair
    // created by `AtomicArc::store`/`AtomicArc::new`.
    let block_ref = unsafe { &*block };
    if block_ref.decref() == 0 {
        unsafe {
            block_ref.destroy();
            drop(Box::from_raw(block as *mut ControlBlock));
        }
    }
    let _ = data;
}

/// A lock-free `Arc`-like cell: load a snapshot, store a new value, with
/// every load and store wait-free aside from the cell's own retry loop.
pub struct AtomicArc<T> {
    cell: ArcCell<T>,
}

impl<T> AtomicArc<T> {
    pub fn new(value: T) -> Self {
        let arc = Self {
            cell: ArcCell::empty(),
        };
        arc.store(value);
        arc
    }

    /// Atomically replaces the stored value. The old value's destructor may
    /// run on this thread, inside this call, if this was the only
    /// outstanding reference to it — otherwise it runs later, whenever the
    /// last [`ArcGuard`] to it is dropped.
    pub fn store(&self, value: T) {
        let data = Box::into_raw(Box::new(value));
        let block = Box::into_raw(Box::new(ControlBlock::new(
            data as *mut (),
            destroy_data::<T>,
        )));
        // SAFETY: `block`/`data` were just allocated above; this function
        // is their only owner so far.
        unsafe { self.cell.atomic_store(block, data) };
        // `atomic_store` cloned out its own reference for the cell; release
        // this function's now-redundant local one.
        release_pair(block, data);
    }

    /// Loads the currently stored value. Returns `None` only if the cell
    /// was never stored into — `new`/`store` make that unreachable through
    /// the public API.
    pub fn load(&self) -> Option<ArcGuard<'_, T>> {
        self.cell.atomic_load().map(|held| ArcGuard {
            held,
            _marker: PhantomData,
        })
    }
}

impl<T> Drop for AtomicArc<T> {
    fn drop(&mut self) {
        if let Some(held) = self.cell.atomic_load() {
            let block_ptr = held.control_block() as *const ControlBlock;
            let data_ptr = held.data();
            // One reference for this diagnostic load, one for the cell's
            // own standing reference — both release here since no other
            // thread can observe this cell once we have `&mut self`.
            release_pair(block_ptr, data_ptr);
            release_pair(block_ptr, data_ptr);
        }
    }
}

/// A live reference to an `AtomicArc`'s value at the moment it was loaded.
/// The value this guard points at cannot be freed while the guard is alive,
/// even if the `AtomicArc` is stored into again in the meantime.
pub struct ArcGuard<'a, T> {
    held: Held<T>,
    _marker: PhantomData<&'a AtomicArc<T>>,
}

impl<'a, T> Deref for ArcGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the control block's refcount accounts for this guard, so
        // the data it points at is live for the guard's lifetime.
        unsafe { &*self.held.data() }
    }
}

impl<'a, T> Clone for ArcGuard<'a, T> {
    fn clone(&self) -> Self {
        ArcGuard {
            held: ArcCell::<T>::clone_handle(&self.held),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Drop for ArcGuard<'a, T> {
    fn drop(&mut self) {
        let block_ptr = self.held.control_block() as *const ControlBlock;
        let data_ptr = self.held.data();
        release_pair(block_ptr, data_ptr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_then_load_sees_value() {
        let arc = AtomicArc::new(String::from("hello"));
        let guard = arc.load().unwrap();
        assert_eq!(&*guard, "hello");
    }

    #[test]
    fn test_store_replaces_visible_value() {
        let arc = AtomicArc::new(1i32);
        arc.store(2i32);
        let guard = arc.load().unwrap();
        assert_eq!(*guard, 2);
    }

    #[test]
    fn test_old_value_survives_while_guard_held() {
        let arc = AtomicArc::new(vec![1, 2, 3]);
        let guard = arc.load().unwrap();
        arc.store(vec![4, 5, 6]);
        assert_eq!(*guard, vec![1, 2, 3]);
        let fresh = arc.load().unwrap();
        assert_eq!(*fresh, vec![4, 5, 6]);
    }

    #[test]
    fn test_guard_clone_keeps_data_alive_independently() {
        let arc = AtomicArc::new(42i32);
        let guard = arc.load().unwrap();
        let cloned = guard.clone();
        drop(guard);
        assert_eq!(*cloned, 42);
    }

    #[test]
    fn test_concurrent_load_and_store() {
        use std::sync::Arc;
        use std::thread;

        let arc = Arc::new(AtomicArc::new(0i64));
        let mut handles = Vec::new();
        for i in 0..8 {
            let arc = Arc::clone(&arc);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    arc.store(i);
                    let guard = arc.load().unwrap();
                    let _ = *guard;
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
