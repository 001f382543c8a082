//! Move-only owner of a single raw handle
//!
//! Resource ownership rules:
//! - A non-sentinel handle is released exactly once.
//! - A released (or moved-from) owner holds the sentinel and does nothing on drop.
//! - Owners are never cloned; ownership only moves.

use super::RawHandle;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Routine that destroys a raw handle
///
/// Any `FnMut(H)` closure is a releaser, which makes instrumented fakes trivial
/// in tests.
pub trait Release<H> {
    /// Destroy `handle`. Never called with the sentinel.
    fn release(&mut self, handle: H);
}

impl<H, F> Release<H> for F
where
    F: FnMut(H),
{
    fn release(&mut self, handle: H) {
        self(handle);
    }
}

/// Releaser bound to a native system's destroy entry point
///
/// Holds a shared reference to the system so that the handle can be destroyed
/// through the same function table that created it.
pub struct SystemRelease<S: ?Sized, H> {
    system: Rc<S>,
    destroy: fn(&S, H),
}

impl<S: ?Sized, H> SystemRelease<S, H> {
    /// Pair `system` with its destroy function for `H`
    pub fn new(system: Rc<S>, destroy: fn(&S, H)) -> Self {
        Self { system, destroy }
    }

    /// The native system this releaser destroys through
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Shared reference to the native system
    pub fn system_rc(&self) -> &Rc<S> {
        &self.system
    }
}

impl<S: ?Sized, H> Clone for SystemRelease<S, H> {
    fn clone(&self) -> Self {
        Self {
            system: Rc::clone(&self.system),
            destroy: self.destroy,
        }
    }
}

impl<S: ?Sized, H> Release<H> for SystemRelease<S, H> {
    fn release(&mut self, handle: H) {
        (self.destroy)(&self.system, handle);
    }
}

/// Owned handle whose releaser is a native system's destroy function
pub type SystemHandle<S, H> = OwnedHandle<H, SystemRelease<S, H>>;

/// Uniquely owned raw handle
///
/// Copying is impossible: there is no `Clone` or `Copy` implementation, so a
/// live native handle can never have two owners.
///
/// ```compile_fail
/// use media_handles::handle::OwnedHandle;
///
/// let owner = OwnedHandle::new(7u32, |_handle: u32| {});
/// let second_owner = owner.clone();
/// ```
pub struct OwnedHandle<H: RawHandle, R: Release<H>> {
    handle: H,
    releaser: R,
}

impl<H: RawHandle, R: Release<H>> OwnedHandle<H, R> {
    /// Take ownership of `handle`
    ///
    /// Passing the sentinel produces an owner that is already released.
    pub fn new(handle: H, releaser: R) -> Self {
        Self { handle, releaser }
    }

    /// An owner that holds nothing
    pub fn released(releaser: R) -> Self {
        Self::new(H::SENTINEL, releaser)
    }

    /// The raw handle (the sentinel once released)
    pub fn get(&self) -> H {
        self.handle
    }

    /// Whether a live handle is held
    pub fn is_owning(&self) -> bool {
        !self.handle.is_sentinel()
    }

    /// Whether the sentinel is held
    pub fn is_released(&self) -> bool {
        self.handle.is_sentinel()
    }

    /// The release routine
    pub fn releaser(&self) -> &R {
        &self.releaser
    }

    /// Release the handle now
    ///
    /// Idempotent: resetting a released owner does nothing.
    pub fn reset(&mut self) {
        let handle = mem::replace(&mut self.handle, H::SENTINEL);
        if !handle.is_sentinel() {
            self.releaser.release(handle);
        }
    }

    /// Give up ownership without releasing
    ///
    /// The caller becomes responsible for destroying the returned handle.
    pub fn into_raw(mut self) -> H {
        mem::replace(&mut self.handle, H::SENTINEL)
    }

    /// Exchange the contents of two owners
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<H: RawHandle, R: Release<H> + Clone> OwnedHandle<H, R> {
    /// Move ownership out, leaving `self` released
    pub fn take(&mut self) -> Self {
        let handle = mem::replace(&mut self.handle, H::SENTINEL);
        Self::new(handle, self.releaser.clone())
    }
}

impl<H: RawHandle, R: Release<H>> Drop for OwnedHandle<H, R> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<H: RawHandle, R: Release<H>> fmt::Debug for OwnedHandle<H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn counting_releaser(count: &Rc<Cell<usize>>) -> impl FnMut(u32) + Clone {
        let count = Rc::clone(count);
        move |_handle: u32| count.set(count.get() + 1)
    }

    #[test]
    fn test_drop_releases_once() {
        let count = Rc::new(Cell::new(0));
        {
            let _owner = OwnedHandle::new(7u32, counting_releaser(&count));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_release_receives_original_handle() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        drop(OwnedHandle::new(42u32, move |handle: u32| sink.borrow_mut().push(handle)));
        assert_eq!(*seen.borrow(), vec![42]);
    }

    #[test]
    fn test_moves_through_many_temporaries_release_once() {
        let count = Rc::new(Cell::new(0));
        let mut owner = OwnedHandle::new(9u32, counting_releaser(&count));
        for _ in 0..16 {
            let mut temporary = owner.take();
            assert!(owner.is_released());
            owner = temporary.take();
            drop(temporary);
        }
        assert_eq!(count.get(), 0);
        drop(owner);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_take_transfers_ownership() {
        let count = Rc::new(Cell::new(0));
        let mut a = OwnedHandle::new(7u32, counting_releaser(&count));
        let b = a.take();

        assert_eq!(a.get(), u32::SENTINEL);
        assert_eq!(b.get(), 7);
        assert!(a.is_released());
        assert!(b.is_owning());
    }

    #[test]
    fn test_moved_from_drop_is_noop() {
        let count = Rc::new(Cell::new(0));
        let mut a = OwnedHandle::new(7u32, counting_releaser(&count));
        let b = a.take();
        drop(a);
        assert_eq!(count.get(), 0);
        drop(b);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let count = Rc::new(Cell::new(0));
        let mut owner = OwnedHandle::new(3u32, counting_releaser(&count));
        owner.reset();
        owner.reset();
        drop(owner);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_assignment_releases_displaced_handle() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let releaser = move |handle: u32| sink.borrow_mut().push(handle);

        let mut slot = OwnedHandle::new(1u32, releaser.clone());
        slot = OwnedHandle::new(2u32, releaser);
        assert_eq!(*seen.borrow(), vec![1]);

        drop(slot);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_swap_exchanges_handles() {
        let count = Rc::new(Cell::new(0));
        let mut a = OwnedHandle::new(1u32, counting_releaser(&count));
        let mut b = OwnedHandle::new(2u32, counting_releaser(&count));
        a.swap(&mut b);
        assert_eq!(a.get(), 2);
        assert_eq!(b.get(), 1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_into_raw_skips_release() {
        let count = Rc::new(Cell::new(0));
        let owner = OwnedHandle::new(5u32, counting_releaser(&count));
        assert_eq!(owner.into_raw(), 5);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_sentinel_owner_never_releases() {
        let count = Rc::new(Cell::new(0));
        let owner = OwnedHandle::<u32, _>::released(counting_releaser(&count));
        assert!(owner.is_released());
        drop(owner);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_system_release_calls_destroy_entry_point() {
        struct FakeSystem {
            destroyed: RefCell<Vec<u64>>,
        }

        fn destroy(system: &FakeSystem, handle: u64) {
            system.destroyed.borrow_mut().push(handle);
        }

        let system = Rc::new(FakeSystem { destroyed: RefCell::new(Vec::new()) });
        let owner: SystemHandle<FakeSystem, u64> =
            OwnedHandle::new(11, SystemRelease::new(Rc::clone(&system), destroy));
        assert!(std::ptr::eq(owner.releaser().system(), system.as_ref()));
        drop(owner);
        assert_eq!(*system.destroyed.borrow(), vec![11]);
    }
}
