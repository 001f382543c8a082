//! Bridge from sentinel-returning native constructors to owned handles

use super::{OwnedHandle, RawHandle, Release};
use crate::error::{HandleError, HandleResult};

/// Call a native constructor once and take ownership of its result
///
/// `create` receives `args` unchanged (use a tuple for several arguments) and
/// returns a raw handle; the handle type is whatever `create` returns. A
/// sentinel result fails with [`HandleError::CreationFailed`] carrying
/// `description`, and `releaser` is dropped without ever being called.
///
/// ```
/// use media_handles::handle::acquire;
///
/// let make = |x: u32| x;
/// assert!(acquire(make, "fail msg", 0, |_h: u32| {}).is_err());
/// let owned = acquire(make, "ok msg", 7, |_h: u32| {}).unwrap();
/// assert_eq!(owned.get(), 7);
/// ```
pub fn acquire<A, H, F, R>(
    create: F,
    description: &'static str,
    args: A,
    releaser: R,
) -> HandleResult<OwnedHandle<H, R>>
where
    F: FnOnce(A) -> H,
    H: RawHandle,
    R: Release<H>,
{
    let handle = create(args);
    if handle.is_sentinel() {
        return Err(HandleError::CreationFailed(description));
    }
    Ok(OwnedHandle::new(handle, releaser))
}
