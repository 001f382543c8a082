//! Loading resources out of a caller-owned stream

use super::Stream;
use crate::error::HandleResult;
use crate::handle::{acquire, OwnedHandle, RawHandle, Release};
use crate::system::VideoSystem;

/// The auto-close flag passed to every stream loader
///
/// Native loaders close the stream when this is non-zero. The stream is
/// always owned by a [`Stream`], so the loader must never close it.
pub const KEEP_SOURCE: i32 = 0;

/// Create a resource from a stream without giving up the stream
///
/// `loader` receives the raw stream and [`KEEP_SOURCE`]. Native loaders
/// that take more arguments after the stream and the flag get them from
/// the closure's captures:
///
/// ```ignore
/// load_from(&stream, |src, free| video.load_image_texture(renderer, src, free), "...", releaser)
/// ```
///
/// Failure handling is that of [`acquire`].
pub fn load_from<V, H, F, R>(
    stream: &Stream<V>,
    loader: F,
    description: &'static str,
    releaser: R,
) -> HandleResult<OwnedHandle<H, R>>
where
    V: VideoSystem,
    F: FnOnce(V::Stream, i32) -> H,
    H: RawHandle,
    R: Release<H>,
{
    acquire(
        |(source, free_source)| loader(source, free_source),
        description,
        (stream.raw(), KEEP_SOURCE),
        releaser,
    )
}
