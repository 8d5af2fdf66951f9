use std::io::SeekFrom;

use bytes::Bytes;

use crate::{attr::Attr, client::OpenFlags, error::Result};

/// Identifier of an open remote file handle, issued by [`RawTransport::open`]
/// and retired by [`RawTransport::close`].
pub type HandleId = u64;

/// The primitive remote-filesystem capability set the client is built on.
///
/// Every call maps to exactly one flat operation against the storage
/// cluster; there are no recursive primitives at this layer. Recursive
/// deletes, recursive permission changes and path materialization are all
/// composed above this trait by [`Client`](crate::client::Client).
///
/// Implementations own the wire protocol, chunk placement and replication;
/// none of that leaks through this seam. Failures are reported through the
/// crate-wide [`Error`](crate::error::Error) taxonomy.
#[async_trait]
pub trait RawTransport: Send + 'static {
    /// Tears down the connection. The transport is unusable afterwards.
    async fn disconnect(&mut self) -> Result<()>;

    /// Opens `path` with the given flags, creating it with permission bits
    /// `mode` when the flags request creation. `params` carries
    /// transport-specific creation parameters (striping, replication) and is
    /// passed through opaquely.
    async fn open(
        &mut self,
        path: &str,
        flags: OpenFlags,
        mode: u16,
        params: Option<&str>,
    ) -> Result<HandleId>;

    /// Releases an open handle. Using the handle afterwards fails.
    async fn close(&mut self, handle: HandleId) -> Result<()>;

    /// Reads up to `max_len` bytes from the handle's cursor; a short result
    /// means end-of-file was reached.
    async fn read(&mut self, handle: HandleId, max_len: u64) -> Result<Bytes>;

    /// Writes at the handle's cursor, returning the number of bytes accepted.
    async fn write(&mut self, handle: HandleId, data: &[u8]) -> Result<u64>;

    async fn seek(&mut self, handle: HandleId, pos: SeekFrom) -> Result<u64>;

    async fn tell(&mut self, handle: HandleId) -> Result<u64>;

    /// Stats the open handle's target.
    async fn fstat(&mut self, handle: HandleId) -> Result<Attr>;

    /// Applies permission bits to the open handle's target.
    async fn fchmod(&mut self, handle: HandleId, mode: u16) -> Result<()>;

    /// Creates a single directory; every ancestor must already exist.
    async fn mkdir(&mut self, path: &str, mode: u16) -> Result<()>;

    /// Removes a plain file.
    async fn remove(&mut self, path: &str) -> Result<()>;

    /// Removes an empty directory.
    async fn rmdir(&mut self, path: &str) -> Result<()>;

    /// Enumerates a directory's immediate entries in raw transport order.
    /// May include the synthetic `.` and `..` entries.
    async fn readdir(&mut self, path: &str) -> Result<Vec<Attr>>;

    /// Stats `path`. `refresh` forces a metadata cache bypass on transports
    /// that revalidate attributes lazily.
    async fn stat(&mut self, path: &str, refresh: bool) -> Result<Attr>;

    async fn chmod(&mut self, path: &str, mode: u16) -> Result<()>;

    async fn rename(&mut self, old: &str, new: &str) -> Result<()>;

    /// Changes the connection's logical working directory; `path` must
    /// resolve to an existing directory.
    async fn cd(&mut self, path: &str) -> Result<()>;

    /// Sets the working directory without requiring resolution against the
    /// previous one.
    async fn setwd(&mut self, path: &str) -> Result<()>;

    /// Reports the current absolute working directory. Fails with
    /// `NameTooLong` when the result exceeds the transport's name buffer
    /// rather than truncating it.
    async fn cwd(&mut self) -> Result<String>;
}

/// Transports that can establish their own connection to a metaserver.
#[async_trait]
pub trait Connect: RawTransport + Sized {
    async fn connect(host: &str, port: u16) -> Result<Self>;
}
