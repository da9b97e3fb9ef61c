mod command;
pub mod constants;
mod data;
mod message;
mod packet;

pub use command::*;
pub use constants::*;
pub use data::*;
pub use message::*;
pub use packet::*;
