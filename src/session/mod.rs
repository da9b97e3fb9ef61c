mod rtmp_session;
mod timestamp;

pub use rtmp_session::*;
pub use timestamp::*;
