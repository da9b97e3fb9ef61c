mod reader;
mod stream;
mod writer;

pub use reader::*;
pub use stream::*;
pub use writer::*;
