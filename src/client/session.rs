use std::{future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use tokio::sync::Mutex;

use super::{file::File, flags::OpenFlags};
use crate::{
    attr::Attr,
    error::{Error, Result},
    transport::{Connect, RawTransport},
};

/// Boxed future used by the scoped `with_client` / `with_file` forms, so the
/// caller's block can borrow the resource for exactly its own lifetime.
pub type ScopedOp<'a, R> = Pin<Box<dyn Future<Output = Result<R>> + Send + 'a>>;

/// Caller-supplied overrides for [`Client::open_with_flags`].
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Permission bits applied when the open creates the file
    pub perm: u16,
    /// Opaque creation parameters forwarded to the transport (striping,
    /// replication)
    pub params: Option<String>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            perm: 0o666,
            params: None,
        }
    }
}

/// High-level client for a QFS-style distributed filesystem.
///
/// Owns exactly one connection and turns Unix-style requests (mode strings,
/// recursive deletes, recursive permission changes, whole-file reads and
/// writes) into sequenced calls against the flat [`RawTransport`]
/// primitives. Operations run one at a time over the shared connection; the
/// internal mutex only sequences the client against file handles it has
/// produced, it is not a concurrency feature.
pub struct Client<T: RawTransport> {
    raw: Arc<Mutex<T>>,
}

impl<T: Connect> Client<T> {
    /// Connects to the metaserver at `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        Ok(Self::new(T::connect(host, port).await?))
    }

    /// Connects, runs `block` against the client, and releases the
    /// connection on every exit path, including when the block fails.
    ///
    /// ```no_run
    /// # use qfs_client::{Client, Connect, Result};
    /// # async fn example<T: Connect>() -> Result<()> {
    /// let data = Client::<T>::with_client("meta0", 20000, |c| {
    ///     Box::pin(async move { c.read("/user/hi.txt").await })
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_client<R, F>(host: &str, port: u16, block: F) -> Result<R>
    where
        F: for<'a> FnOnce(&'a Self) -> ScopedOp<'a, R>,
    {
        let client = Self::connect(host, port).await?;
        let result = block(&client).await;
        let released = client.release().await;

        let value = result?;
        released?;
        Ok(value)
    }
}

impl<T: RawTransport> Client<T> {
    /// Wraps an already-connected transport.
    pub fn new(transport: T) -> Self {
        Self {
            raw: Arc::new(Mutex::new(transport)),
        }
    }

    /// Tears down the connection. All file handles must be closed first.
    pub async fn release(self) -> Result<()> {
        self.raw.lock().await.disconnect().await
    }

    /// Opens a file using a POSIX-style mode string (see
    /// [`OpenFlags::from_mode`]). Unknown mode strings fail before any
    /// transport call.
    pub async fn open(&self, path: &str, mode: &str) -> Result<File<T>> {
        self.open_with_flags(path, OpenFlags::from_mode(mode)?, OpenOptions::default())
            .await
    }

    /// Opens a file from explicit flags, bypassing mode-string translation.
    /// This is the escape hatch for flag combinations the shorthand does not
    /// cover.
    pub async fn open_with_flags(
        &self,
        path: &str,
        flags: OpenFlags,
        options: OpenOptions,
    ) -> Result<File<T>> {
        let handle = self
            .raw
            .lock()
            .await
            .open(path, flags, options.perm, options.params.as_deref())
            .await?;

        Ok(File::new(self.raw.clone(), handle, flags))
    }

    /// Opens a file, runs `block` against it, and closes the handle on every
    /// exit path, including when the block fails.
    pub async fn with_file<R, F>(&self, path: &str, mode: &str, block: F) -> Result<R>
    where
        F: for<'a> FnOnce(&'a mut File<T>) -> ScopedOp<'a, R>,
    {
        let mut file = self.open(path, mode).await?;
        let result = block(&mut file).await;
        let closed = file.close().await;

        let value = result?;
        closed?;
        Ok(value)
    }

    /// Reads a whole file into memory.
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        let mut file = self.open(path, "r").await?;
        let result = file.read(None).await;
        let closed = file.close().await;

        let data = result?;
        closed?;
        Ok(data)
    }

    /// Writes `data` to `path`, truncating or creating it. Returns the
    /// number of bytes accepted by the transport.
    pub async fn write(&self, path: &str, data: &[u8]) -> Result<u64> {
        let mut file = self.open(path, "w").await?;
        let result = file.write(data).await;
        let closed = file.close().await;

        let written = result?;
        closed?;

        if written < data.len() as u64 {
            warn!("partial write to {path}: {written} of {} bytes", data.len());
        }

        Ok(written)
    }

    /// Removes a plain file. With `force`, a missing path is a no-op
    /// reported as `Ok(0)`; every other failure still propagates.
    pub async fn remove(&self, path: &str, force: bool) -> Result<u64> {
        let result = self.raw.lock().await.remove(path).await.map(|()| 1);
        suppress_not_found(force, result)
    }

    /// Removes an empty directory, with the same `force` semantics as
    /// [`remove`](Self::remove).
    pub async fn rmdir(&self, path: &str, force: bool) -> Result<u64> {
        let result = self.raw.lock().await.rmdir(path).await.map(|()| 1);
        suppress_not_found(force, result)
    }

    /// Removes a directory and all descendant directories, children before
    /// parents. Plain files anywhere in the tree make the walk fail with the
    /// transport's not-empty condition. Returns the number of directories
    /// removed.
    pub async fn rmdirs(&self, path: &str, force: bool) -> Result<u64> {
        let result = self.rmdir_tree(path.to_owned()).await;
        suppress_not_found(force, result)
    }

    /// Removes a file, or a directory tree depth-first: entries before their
    /// directory, the named path last. Returns the number of entries
    /// removed. A failure partway through leaves the completed removals in
    /// place.
    pub async fn rm_rf(&self, path: &str, force: bool) -> Result<u64> {
        debug!("removing tree at {path}");
        let result = self.remove_tree(path.to_owned()).await;
        suppress_not_found(force, result)
    }

    /// Creates a single directory; every ancestor must already exist.
    pub async fn mkdir(&self, path: &str, mode: u16) -> Result<()> {
        self.raw.lock().await.mkdir(path, mode).await
    }

    /// Creates every missing ancestor of `path` with the given mode.
    /// Succeeds when the full path already exists as a directory and fails
    /// with a not-a-directory condition when a segment exists as a plain
    /// file.
    pub async fn mkdir_p(&self, path: &str, mode: u16) -> Result<()> {
        let mut prefix = String::new();
        if path.starts_with('/') {
            prefix.push('/');
        }

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() && !prefix.ends_with('/') {
                prefix.push('/');
            }
            prefix.push_str(segment);

            // bind first so the lock is released before the mkdir below
            let stat = self.raw.lock().await.stat(&prefix, false).await;
            match stat {
                Ok(attr) if attr.is_dir() => {}
                Ok(_) => return Err(Error::NotADirectory(prefix)),
                Err(err) if err.is_not_found() => {
                    self.raw.lock().await.mkdir(&prefix, mode).await?;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Collects a directory's entries in raw enumeration order, with the
    /// synthetic `.` and `..` entries filtered out.
    pub async fn readdir(&self, path: &str) -> Result<Vec<Attr>> {
        let mut entries = Vec::new();
        let _ = self.readdir_with(path, |attr| entries.push(attr)).await?;
        Ok(entries)
    }

    /// Streams a directory's entries to `sink` as they are produced, with
    /// the same filtering as [`readdir`](Self::readdir). Returns the number
    /// of entries delivered.
    pub async fn readdir_with<F>(&self, path: &str, mut sink: F) -> Result<u64>
    where
        F: FnMut(Attr),
    {
        let entries = self.raw.lock().await.readdir(path).await?;
        let mut count = 0;

        for attr in entries.into_iter().filter(|a| !is_dot(&a.filename)) {
            count += 1;
            sink(attr);
        }

        Ok(count)
    }

    /// Fetches an attribute snapshot for `path`.
    pub async fn stat(&self, path: &str) -> Result<Attr> {
        self.raw.lock().await.stat(path, false).await
    }

    /// Like [`stat`](Self::stat), but forces the transport to bypass its
    /// attribute cache.
    pub async fn stat_fresh(&self, path: &str) -> Result<Attr> {
        self.raw.lock().await.stat(path, true).await
    }

    /// Applies permission bits to exactly the named path.
    pub async fn chmod(&self, path: &str, mode: u16) -> Result<()> {
        self.raw.lock().await.chmod(path, mode).await
    }

    /// Applies the identical literal mode to `path` and every descendant,
    /// files and directories alike, each visited exactly once. Children are
    /// processed before their directory so a lowered directory mode cannot
    /// lock the walk out of the subtree. Returns the number of entries
    /// changed.
    pub async fn chmod_recursive(&self, path: &str, mode: u16) -> Result<u64> {
        debug!("chmod {mode:o} over tree at {path}");
        self.chmod_tree(path.to_owned(), mode).await
    }

    /// Renames a file or directory.
    pub async fn rename(&self, old: &str, new: &str) -> Result<()> {
        self.raw.lock().await.rename(old, new).await
    }

    /// Changes the working directory; relative paths in later calls resolve
    /// against it.
    pub async fn cd(&self, path: &str) -> Result<()> {
        self.raw.lock().await.cd(path).await
    }

    /// Sets the working directory directly.
    pub async fn setwd(&self, path: &str) -> Result<()> {
        self.raw.lock().await.setwd(path).await
    }

    /// Reports the current absolute working directory.
    pub async fn cwd(&self) -> Result<String> {
        self.raw.lock().await.cwd().await
    }

    /// Checks whether anything exists at `path`.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        match self.raw.lock().await.stat(path, false).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Checks whether `path` exists and is a plain file.
    pub async fn is_file(&self, path: &str) -> Result<bool> {
        match self.raw.lock().await.stat(path, false).await {
            Ok(attr) => Ok(attr.is_file()),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Checks whether `path` exists and is a directory.
    pub async fn is_directory(&self, path: &str) -> Result<bool> {
        match self.raw.lock().await.stat(path, false).await {
            Ok(attr) => Ok(attr.is_dir()),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn remove_tree(&self, path: String) -> ScopedOp<'_, u64> {
        Box::pin(async move {
            let attr = self.raw.lock().await.stat(&path, false).await?;
            if attr.is_file() {
                self.raw.lock().await.remove(&path).await?;
                return Ok(1);
            }

            let mut removed = 0;
            for entry in self.readdir(&path).await? {
                let child = join(&path, &entry.filename);
                if entry.directory {
                    removed += self.remove_tree(child).await?;
                } else {
                    self.raw.lock().await.remove(&child).await?;
                    removed += 1;
                }
            }

            self.raw.lock().await.rmdir(&path).await?;
            Ok(removed + 1)
        })
    }

    fn rmdir_tree(&self, path: String) -> ScopedOp<'_, u64> {
        Box::pin(async move {
            let mut removed = 0;
            for entry in self.readdir(&path).await? {
                if entry.directory {
                    removed += self.rmdir_tree(join(&path, &entry.filename)).await?;
                }
            }

            self.raw.lock().await.rmdir(&path).await?;
            Ok(removed + 1)
        })
    }

    fn chmod_tree(&self, path: String, mode: u16) -> ScopedOp<'_, u64> {
        Box::pin(async move {
            let attr = self.raw.lock().await.stat(&path, false).await?;
            let mut changed = 0;

            if attr.is_dir() {
                for entry in self.readdir(&path).await? {
                    let child = join(&path, &entry.filename);
                    if entry.directory {
                        changed += self.chmod_tree(child, mode).await?;
                    } else {
                        self.raw.lock().await.chmod(&child, mode).await?;
                        changed += 1;
                    }
                }
            }

            self.raw.lock().await.chmod(&path, mode).await?;
            Ok(changed + 1)
        })
    }
}

/// Downgrades a not-found failure to a zero-effect success when `force` is
/// set. Every other failure passes through untouched.
fn suppress_not_found(force: bool, result: Result<u64>) -> Result<u64> {
    match result {
        Err(err) if force && err.is_not_found() => Ok(0),
        other => other,
    }
}

fn is_dot(name: &str) -> bool {
    name == "." || name == ".."
}

fn join(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}
