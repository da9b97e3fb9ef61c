// Message types
pub const MSG_TYPE_SET_CHUNK_SIZE: u8 = 1;
pub const MSG_TYPE_ABORT: u8 = 2;
pub const MSG_TYPE_ACK: u8 = 3;
pub const MSG_TYPE_USER_CONTROL: u8 = 4;
pub const MSG_TYPE_WINDOW_ACK: u8 = 5;
pub const MSG_TYPE_SET_PEER_BW: u8 = 6;
pub const MSG_TYPE_AUDIO: u8 = 8;
pub const MSG_TYPE_VIDEO: u8 = 9;
pub const MSG_TYPE_DATA_AMF0: u8 = 18;
pub const MSG_TYPE_COMMAND_AMF0: u8 = 20;

// Chunk stream ids used by the publisher
pub const CHUNK_STREAM_CONTROL: u32 = 2;
pub const CHUNK_STREAM_COMMAND: u32 = 3;
pub const CHUNK_STREAM_MEDIA: u32 = 5;

// User control event types
pub const USER_CONTROL_STREAM_BEGIN: u16 = 0;
pub const USER_CONTROL_STREAM_EOF: u16 = 1;
pub const USER_CONTROL_PING_REQUEST: u16 = 6;
pub const USER_CONTROL_PING_RESPONSE: u16 = 7;

// Defaults and protocol bounds
pub const DEFAULT_CHUNK_SIZE: u32 = 4096;
pub const MIN_CHUNK_SIZE: u32 = 128;
pub const DEFAULT_WINDOW_ACK_SIZE: u32 = 2_500_000;

// FLV tag types accepted by the passthrough path
pub const FLV_TAG_AUDIO: u8 = 0x08;
pub const FLV_TAG_VIDEO: u8 = 0x09;
pub const FLV_TAG_META: u8 = 0x12;

// Well-known reply codes
pub const CODE_CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
pub const CODE_PUBLISH_START: &str = "NetStream.Publish.Start";
