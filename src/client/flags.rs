use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opening flags passed to [`RawTransport::open`](crate::transport::RawTransport::open)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFlags(u32);

bitflags! {
    impl OpenFlags: u32 {
        const READ = 0x0000_0001;
        const WRITE = 0x0000_0002;
        const APPEND = 0x0000_0004;
        const CREATE = 0x0000_0008;
        const TRUNCATE = 0x0000_0010;
        const EXCLUDE = 0x0000_0020;
    }
}

impl OpenFlags {
    /// Translates a POSIX-style mode string into open flags.
    ///
    /// * `r`: read only
    /// * `r+`: read and write
    /// * `w`: write only, truncate or create
    /// * `w+`: read and write, truncate or create
    /// * `a`: write only, append, create if missing
    /// * `a+`: read and write, append, create if missing
    ///
    /// Any other token fails with [`Error::InvalidArgument`] before a single
    /// transport call is made.
    pub fn from_mode(mode: &str) -> Result<Self> {
        Ok(match mode {
            "r" => Self::READ,
            "r+" => Self::READ | Self::WRITE,
            "w" => Self::WRITE | Self::CREATE | Self::TRUNCATE,
            "w+" => Self::READ | Self::WRITE | Self::CREATE | Self::TRUNCATE,
            "a" => Self::WRITE | Self::APPEND | Self::CREATE,
            "a+" => Self::READ | Self::WRITE | Self::APPEND | Self::CREATE,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "{other:?} is not a valid mode string"
                )))
            }
        })
    }
}
