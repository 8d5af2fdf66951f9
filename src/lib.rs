#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate async_trait;

mod attr;
/// High-level client side
pub mod client;
mod error;
/// Transport capability seam
pub mod transport;

pub use attr::Attr;
pub use client::{Client, File, OpenFlags, OpenOptions};
pub use error::{Error, Result};
pub use transport::{Connect, HandleId, RawTransport};
