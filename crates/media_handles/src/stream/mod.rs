//! Byte streams
//!
//! [`Stream`] owns a native stream object (the source that loaders read
//! from) and closes it on drop. Loaders never take that ownership away:
//! [`load_from`] always asks the native loader to leave the stream open.

mod bridge;

pub use bridge::{load_from, KEEP_SOURCE};

use crate::error::HandleResult;
use crate::handle::{acquire, SystemHandle, SystemRelease};
use crate::system::{log_creation, StreamKind, VideoSystem};
use std::borrow::Cow;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

/// Callbacks behind a custom stream
///
/// Every `Read + Write + Seek` type is already a `StreamOps`. Return values
/// follow the native conventions: byte counts for I/O, a negative number on
/// failure for size and seek.
pub trait StreamOps {
    /// Total size in bytes, negative if unknown
    fn size(&mut self) -> i64;
    /// Move the cursor and return the new offset
    fn seek(&mut self, pos: SeekFrom) -> i64;
    /// Fill `buf` and return the number of bytes read
    fn read(&mut self, buf: &mut [u8]) -> usize;
    /// Write `buf` and return the number of bytes written
    fn write(&mut self, buf: &[u8]) -> usize;
    /// Called once when the stream is closed
    fn close(&mut self) -> i32 {
        0
    }
}

impl<T: Read + Write + Seek> StreamOps for T {
    fn size(&mut self) -> i64 {
        let Ok(current) = self.stream_position() else {
            return -1;
        };
        let end = Seek::seek(self, SeekFrom::End(0));
        if Seek::seek(self, SeekFrom::Start(current)).is_err() {
            return -1;
        }
        end.ok().and_then(|end| i64::try_from(end).ok()).unwrap_or(-1)
    }

    fn seek(&mut self, pos: SeekFrom) -> i64 {
        Seek::seek(self, pos)
            .ok()
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(-1)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        Read::read(self, buf).unwrap_or(0)
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        Write::write(self, buf).unwrap_or(0)
    }
}

/// Owned native byte stream
pub struct Stream<V: VideoSystem> {
    handle: SystemHandle<V, V::Stream>,
}

impl<V: VideoSystem> Stream<V> {
    /// Open a file; `mode` uses `fopen` syntax (`"rb"`, `"w+"`, ...)
    pub fn from_file(video: &Rc<V>, path: &str, mode: &str) -> HandleResult<Self> {
        let handle = acquire(
            |(path, mode)| video.stream_from_file(path, mode),
            "Failed to open file stream",
            (path, mode),
            SystemRelease::new(Rc::clone(video), V::close_stream),
        );
        log_creation(video.as_ref(), "file stream", handle).map(|handle| Self { handle })
    }

    /// Read-write stream over a fixed-size buffer
    ///
    /// Writes never grow the buffer.
    pub fn from_mem(video: &Rc<V>, mem: Vec<u8>) -> HandleResult<Self> {
        let handle = acquire(
            |mem| video.stream_from_mem(mem),
            "Failed to create memory stream",
            mem,
            SystemRelease::new(Rc::clone(video), V::close_stream),
        );
        log_creation(video.as_ref(), "memory stream", handle).map(|handle| Self { handle })
    }

    /// Read-only stream over a buffer
    pub fn from_const_mem(video: &Rc<V>, mem: impl Into<Cow<'static, [u8]>>) -> HandleResult<Self> {
        let handle = acquire(
            |mem| video.stream_from_const_mem(mem),
            "Failed to create read-only memory stream",
            mem.into(),
            SystemRelease::new(Rc::clone(video), V::close_stream),
        );
        log_creation(video.as_ref(), "read-only memory stream", handle).map(|handle| Self { handle })
    }

    /// Stream driven by caller-supplied callbacks
    pub fn custom(video: &Rc<V>, ops: Box<dyn StreamOps>) -> HandleResult<Self> {
        let handle = acquire(
            |ops| video.stream_from_ops(ops),
            "Failed to create custom stream",
            ops,
            SystemRelease::new(Rc::clone(video), V::close_stream),
        );
        log_creation(video.as_ref(), "custom stream", handle).map(|handle| Self { handle })
    }

    /// The native stream handle
    pub fn raw(&self) -> V::Stream {
        self.handle.get()
    }

    /// The native system owning this stream
    pub fn system(&self) -> &Rc<V> {
        self.handle.releaser().system_rc()
    }

    /// Total size in bytes, negative if unknown
    pub fn size(&self) -> i64 {
        self.system().stream_size(self.raw())
    }

    /// Read into `buf`; returns the byte count (0 on error or end of data)
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.system().stream_read(self.raw(), buf)
    }

    /// Write `buf`; returns the byte count
    pub fn write(&self, buf: &[u8]) -> usize {
        self.system().stream_write(self.raw(), buf)
    }

    /// Move the cursor; returns the new offset or a negative error
    pub fn seek(&self, pos: SeekFrom) -> i64 {
        self.system().stream_seek(self.raw(), pos)
    }

    /// Current offset
    pub fn tell(&self) -> i64 {
        self.system().stream_tell(self.raw())
    }

    /// What the stream reads from
    pub fn kind(&self) -> StreamKind {
        self.system().stream_kind(self.raw())
    }
}

impl<V: VideoSystem> std::fmt::Debug for Stream<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream").field("handle", &self.raw()).finish()
    }
}

impl<V: VideoSystem> Read for Stream<V> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Self::read(self, buf))
    }
}

impl<V: VideoSystem> Write for Stream<V> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Self::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<V: VideoSystem> Seek for Stream<V> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let offset = Self::seek(self, pos);
        u64::try_from(offset).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, self.system().last_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSystem, ResourceKind};
    use crate::HandleError;
    use std::io::Cursor;

    #[test]
    fn test_memory_stream_read_write_seek() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_mem(&video, vec![0u8; 8]).unwrap();
        assert_eq!(stream.kind(), StreamKind::Memory);
        assert_eq!(stream.size(), 8);

        assert_eq!(stream.write(b"abcd"), 4);
        assert_eq!(stream.tell(), 4);
        assert_eq!(stream.seek(SeekFrom::Start(1)), 1);

        let mut buf = [0u8; 3];
        assert_eq!(stream.read(&mut buf), 3);
        assert_eq!(&buf, b"bcd");
    }

    #[test]
    fn test_memory_stream_does_not_grow() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_mem(&video, vec![0u8; 4]).unwrap();
        assert_eq!(stream.write(b"abcdef"), 4);
        assert_eq!(stream.size(), 4);
    }

    #[test]
    fn test_const_memory_stream_is_read_only() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::from_const_mem(&video, &b"hello"[..]).unwrap();
        assert_eq!(stream.kind(), StreamKind::MemoryReadOnly);
        assert_eq!(stream.write(b"x"), 0);

        let mut text = String::new();
        let mut stream = stream;
        stream.read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_custom_stream_forwards_to_ops() {
        let video = Rc::new(HeadlessSystem::new());
        let stream = Stream::custom(&video, Box::new(Cursor::new(b"0123456789".to_vec()))).unwrap();
        assert_eq!(stream.kind(), StreamKind::Unknown);
        assert_eq!(stream.size(), 10);
        assert_eq!(stream.seek(SeekFrom::End(-2)), 8);

        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf), 2);
        assert_eq!(&buf[..2], b"89");
    }

    #[test]
    fn test_missing_file_fails() {
        let video = Rc::new(HeadlessSystem::new());
        let result = Stream::from_file(&video, "does/not/exist.bin", "rb");
        assert_eq!(result.unwrap_err(), HandleError::CreationFailed("Failed to open file stream"));
        assert_eq!(video.stats(ResourceKind::Stream).created, 0);
    }

    #[test]
    fn test_file_stream_round_trip() {
        let path = std::env::temp_dir().join(format!("media_handles_stream_{}.bin", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        let video = Rc::new(HeadlessSystem::new());
        {
            let mut stream = Stream::from_file(&video, &path, "wb").unwrap();
            assert_eq!(stream.kind(), StreamKind::File);
            stream.write_all(b"file contents").unwrap();
        }
        let mut stream = Stream::from_file(&video, &path, "rb").unwrap();
        let mut text = String::new();
        stream.read_to_string(&mut text).unwrap();
        assert_eq!(text, "file contents");
        drop(stream);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_drop_closes_stream() {
        let video = Rc::new(HeadlessSystem::new());
        {
            let _stream = Stream::from_mem(&video, vec![1, 2, 3]).unwrap();
            assert_eq!(video.live(ResourceKind::Stream), 1);
        }
        assert_eq!(video.live(ResourceKind::Stream), 0);
        assert_eq!(video.stats(ResourceKind::Stream).destroyed, 1);
    }

    #[test]
    fn test_io_seek_reports_negative_offsets() {
        let video = Rc::new(HeadlessSystem::new());
        let mut stream = Stream::from_mem(&video, vec![0u8; 4]).unwrap();
        assert!(Seek::seek(&mut stream, SeekFrom::Current(-10)).is_err());
    }
}
