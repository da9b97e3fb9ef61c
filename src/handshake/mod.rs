mod client;
mod digest;

pub use client::*;
pub use digest::*;

/// RTMP version
pub const RTMP_VERSION: u8 = 3;

/// Handshake packet size (C1/S1/C2/S2)
pub const HANDSHAKE_SIZE: usize = 1536;
