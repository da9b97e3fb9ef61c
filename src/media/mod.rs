mod frame;
mod packetizer;

pub use frame::*;
pub use packetizer::*;
