use std::{fmt, io::SeekFrom, sync::Arc};

use bytes::Bytes;
use tokio::{runtime::Handle, sync::Mutex};

use super::OpenFlags;
use crate::{
    attr::Attr,
    error::Result,
    transport::{HandleId, RawTransport},
};

/// An open file on the remote filesystem.
///
/// Wraps one raw handle and shares the owning client's connection. The
/// cursor position lives on the transport side and is observed through
/// [`tell`](Self::tell).
///
/// A file must be closed before the owning client is released. Dropping an
/// unclosed file spawns a best-effort close on the current runtime; explicit
/// [`close`](Self::close) (or the client's scoped `with_file`) is the
/// reliable path.
pub struct File<T: RawTransport> {
    raw: Arc<Mutex<T>>,
    handle: HandleId,
    flags: OpenFlags,
    closed: bool,
}

impl<T: RawTransport> File<T> {
    pub(crate) fn new(raw: Arc<Mutex<T>>, handle: HandleId, flags: OpenFlags) -> Self {
        Self {
            raw,
            handle,
            flags,
            closed: false,
        }
    }

    /// The flags the file was opened with
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Reads up to `len` bytes from the cursor. With `None`, stats the
    /// handle first and reads everything remaining between the cursor and
    /// end-of-file in one request. A short result means the transport hit
    /// end-of-file.
    pub async fn read(&mut self, len: Option<u64>) -> Result<Bytes> {
        let len = match len {
            Some(len) => len,
            None => {
                let mut raw = self.raw.lock().await;
                let size = raw.fstat(self.handle).await?.size;
                let pos = raw.tell(self.handle).await?;
                size.saturating_sub(pos)
            }
        };

        self.raw.lock().await.read(self.handle, len).await
    }

    /// Writes at the cursor, returning the number of bytes accepted.
    pub async fn write(&mut self, data: &[u8]) -> Result<u64> {
        self.raw.lock().await.write(self.handle, data).await
    }

    /// Moves the cursor, returning the new absolute offset.
    pub async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.raw.lock().await.seek(self.handle, pos).await
    }

    /// Reports the current cursor offset.
    pub async fn tell(&self) -> Result<u64> {
        self.raw.lock().await.tell(self.handle).await
    }

    /// Fetches a fresh attribute snapshot for the file.
    pub async fn stat(&self) -> Result<Attr> {
        self.raw.lock().await.fstat(self.handle).await
    }

    /// Applies permission bits to the file. Recursion is a client-level
    /// concept and never applies here.
    pub async fn chmod(&self, mode: u16) -> Result<()> {
        self.raw.lock().await.fchmod(self.handle, mode).await
    }

    /// Releases the raw handle. The file is unusable afterwards.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let result = self.raw.lock().await.close(self.handle).await;
        self.closed = true;
        result
    }
}

impl<T: RawTransport> fmt::Debug for File<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("handle", &self.handle)
            .field("flags", &self.flags)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<T: RawTransport> Drop for File<T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        if let Ok(rt) = Handle::try_current() {
            let raw = self.raw.clone();
            let handle = self.handle;

            let _ = rt.spawn(async move {
                if raw.lock().await.close(handle).await.is_err() {
                    warn!("failed to close dropped file handle {handle}");
                }
            });
        }
    }
}
