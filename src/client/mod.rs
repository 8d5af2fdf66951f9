mod file;
mod flags;
mod session;

pub use file::File;
pub use flags::OpenFlags;
pub use session::{Client, OpenOptions, ScopedOp};
