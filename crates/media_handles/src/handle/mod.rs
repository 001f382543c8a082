//! Owning-handle primitives
//!
//! Everything in this crate is built from two pieces:
//!
//! - [`OwnedHandle`]: a move-only value holding one raw handle plus the
//!   routine that releases it. It releases exactly once, on drop or reset.
//! - [`acquire`]: adapts any sentinel-returning native constructor into an
//!   [`OwnedHandle`] or a [`HandleError::CreationFailed`](crate::HandleError).
//!
//! Resource wrappers (windows, textures, GL buffers, ...) each embed a single
//! `OwnedHandle` and forward their behavior to the native library.

mod acquire;
mod owned;

pub use acquire::acquire;
pub use owned::{OwnedHandle, Release, SystemHandle, SystemRelease};

use std::fmt::Debug;

/// An opaque value produced by a native API
///
/// Valid handles are anything but [`RawHandle::SENTINEL`]. Native
/// constructors return the sentinel to signal failure.
pub trait RawHandle: Copy + PartialEq + Debug {
    /// The designated invalid value
    const SENTINEL: Self;

    /// Whether this is the sentinel value
    fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl RawHandle for u32 {
    const SENTINEL: Self = 0;
}

impl RawHandle for u64 {
    const SENTINEL: Self = 0;
}

impl RawHandle for usize {
    const SENTINEL: Self = 0;
}

impl<T> RawHandle for *mut T {
    const SENTINEL: Self = std::ptr::null_mut();
}

impl<T> RawHandle for *const T {
    const SENTINEL: Self = std::ptr::null();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sentinels() {
        assert!(0u32.is_sentinel());
        assert!(0u64.is_sentinel());
        assert!(!7usize.is_sentinel());
    }

    #[test]
    fn test_pointer_sentinels() {
        let null: *mut u8 = RawHandle::SENTINEL;
        assert!(null.is_null());
        assert!(null.is_sentinel());

        let value = 3u8;
        let ptr: *const u8 = &value;
        assert!(!ptr.is_sentinel());
    }
}
