use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable metadata snapshot of one filesystem entry.
///
/// Produced by every stat-returning operation (`stat`, `readdir`, handle
/// `stat`). A snapshot never changes after it is obtained; observing a newer
/// state requires another stat, optionally with a cache refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    /// Base filename of the entry, relative to its parent
    pub filename: String,
    pub id: u64,
    /// Permission bits; bits 8..0 are the nine rwx bits for
    /// owner/group/other, independent of any set-uid or sticky bits
    pub mode: u16,
    pub uid: u32,
    pub gid: u32,
    pub mtime: DateTime<Utc>,
    /// Attribute-change time
    pub ctime: DateTime<Utc>,
    pub directory: bool,
    /// Size in bytes; 0 for directories
    pub size: u64,
    pub chunks: u64,
    /// Number of subdirectories, for directory entries
    pub directories: u64,
    pub replicas: u32,
    pub stripes: u32,
    pub recovery_stripes: u32,
    pub striper_type: u32,
    pub stripe_size: u32,
    pub min_tier: u8,
    pub max_tier: u8,
}

impl Attr {
    pub fn is_dir(&self) -> bool {
        self.directory
    }

    /// Returns `true` if the entry is a plain file
    pub fn is_file(&self) -> bool {
        !self.directory
    }

    /// The nine permission bits, with anything above them masked off
    pub fn permissions(&self) -> u16 {
        self.mode & 0o777
    }
}

/// Canonical single-line listing: a type character (`d` or `-`), nine
/// permission characters most-significant bit first, a space, and the base
/// filename. `0o644` on a plain file renders as `-rw-r--r-- <name>`.
impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.directory { 'd' } else { '-' })?;

        for bit in (0..9).rev() {
            let c = match bit % 3 {
                2 => 'r',
                1 => 'w',
                _ => 'x',
            };

            write!(f, "{}", if self.mode & (1 << bit) != 0 { c } else { '-' })?;
        }

        write!(f, " {}", self.filename)
    }
}
