//! Output sinks for reconstructed files.
//!
//! A download fans out over chunk tasks that each write one disjoint byte
//! range. Both sink kinds support concurrent positional writes: the file sink
//! through lock-free `pwrite`-style writes, the memory sink through a short
//! critical section around the pre-sized buffer.

use std::io;
use std::sync::Mutex;

/// Cross-platform positional file write.
///
/// Writes `buf` to `file` at the given byte `offset`, equivalent to Unix `pwrite`.
#[cfg(unix)]
fn write_all_at(file: &std::fs::File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

/// Cross-platform positional file write.
///
/// Writes `buf` to `file` at the given byte `offset`, equivalent to Unix `pwrite`.
#[cfg(windows)]
fn write_all_at(file: &std::fs::File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    let mut written = 0;
    while written < buf.len() {
        let n = file.seek_write(&buf[written..], offset + written as u64)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ));
        }
        written += n;
    }
    Ok(())
}

/// Cross-platform positional file write.
///
/// Writes `buf` to `file` at the given byte `offset`, equivalent to Unix `pwrite`.
#[cfg(not(any(unix, windows)))]
fn write_all_at(_file: &std::fs::File, _buf: &[u8], _offset: u64) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "positional writes not supported on this platform",
    ))
}

/// Destination of one file download: an in-memory buffer or an on-disk file,
/// both pre-sized to the file's total length before any chunk task runs.
pub(crate) enum Sink {
    /// Pre-allocated byte buffer
    Memory(Mutex<Vec<u8>>),
    /// File pre-truncated to the final size
    File(std::fs::File),
}

impl Sink {
    /// Allocate an in-memory sink of `size` bytes.
    pub(crate) fn memory(size: u64) -> io::Result<Sink> {
        let size = usize::try_from(size).map_err(|_| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("file of {} bytes does not fit an in-memory buffer", size),
            )
        })?;
        Ok(Sink::Memory(Mutex::new(vec![0u8; size])))
    }

    /// Write `buf` at `offset`. Callers guarantee ranges are disjoint, so
    /// concurrent writes never observe each other.
    pub(crate) fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        match self {
            Sink::Memory(buffer) => {
                let mut guard = buffer
                    .lock()
                    .map_err(|_| io::Error::other("memory sink lock poisoned"))?;
                let start = usize::try_from(offset)
                    .map_err(|_| io::Error::other(format!("offset {} overflows buffer", offset)))?;
                let end = start.checked_add(buf.len()).ok_or_else(|| {
                    io::Error::other(format!("range at offset {} overflows buffer", offset))
                })?;
                let len = guard.len();
                guard
                    .get_mut(start..end)
                    .ok_or_else(|| {
                        io::Error::other(format!(
                            "range [{}, {}) exceeds buffer of {} bytes",
                            start, end, len
                        ))
                    })?
                    .copy_from_slice(buf);
                Ok(())
            }
            Sink::File(file) => write_all_at(file, buf, offset),
        }
    }

    /// Flush sink contents to stable storage (no-op for the memory sink).
    pub(crate) fn sync(&self) -> io::Result<()> {
        match self {
            Sink::Memory(_) => Ok(()),
            Sink::File(file) => file.sync_all(),
        }
    }

    /// Take the completed buffer out of a memory sink.
    ///
    /// Returns `None` for file sinks, whose contents live on disk.
    pub(crate) fn into_memory(self) -> Option<Vec<u8>> {
        match self {
            Sink::Memory(buffer) => buffer.into_inner().ok(),
            Sink::File(_) => None,
        }
    }
}
