mod buffer;
mod crypto;
mod error;
mod time;

pub use buffer::*;
pub use crypto::*;
pub use error::*;
pub use time::*;
