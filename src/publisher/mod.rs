mod config;
mod connection;
mod error;
mod listener;
mod outbound;
mod rtmp_publisher;
mod state;

pub use config::*;
pub use error::*;
pub use listener::*;
pub use rtmp_publisher::*;
pub use state::*;

pub(crate) use connection::*;
pub(crate) use outbound::*;
