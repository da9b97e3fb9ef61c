mod utils;
mod amf;
mod protocol;
mod handshake;
mod chunk;
mod session;
mod media;
mod publisher;

// Re-export commonly used types at crate root
pub use utils::*;
pub use amf::*;
pub use protocol::*;
pub use chunk::*;
pub use handshake::*;
pub use session::*;
pub use media::*;

// Publisher exports
pub use publisher::{
    PublishErrorKind, PublisherConfig, PublisherConfigBuilder, PublisherListener, PublisherState,
    RtmpPublisher,
};
