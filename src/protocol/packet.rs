use crate::protocol::constants::*;

/// One complete RTMP message: header plus fully assembled body bytes.
/// The chunk layer splits and reassembles these without caring about the
/// body's meaning.
#[derive(Debug, Clone)]
pub struct RtmpPacket {
    pub header: RtmpHeader,
    pub payload: Vec<u8>,
}

impl RtmpPacket {
    pub fn new(header: RtmpHeader, payload: Vec<u8>) -> Self {
        let mut header = header;
        header.message_length = payload.len() as u32;
        RtmpPacket { header, payload }
    }

    pub fn message_type(&self) -> u8 {
        self.header.message_type
    }

    pub fn message_stream_id(&self) -> u32 {
        self.header.message_stream_id
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }

    pub fn is_command(&self) -> bool {
        self.header.message_type == MSG_TYPE_COMMAND_AMF0
    }

    pub fn is_control(&self) -> bool {
        matches!(
            self.header.message_type,
            MSG_TYPE_SET_CHUNK_SIZE
                | MSG_TYPE_ABORT
                | MSG_TYPE_ACK
                | MSG_TYPE_USER_CONTROL
                | MSG_TYPE_WINDOW_ACK
                | MSG_TYPE_SET_PEER_BW
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtmpHeader {
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type: u8,
    pub message_stream_id: u32,
    pub chunk_stream_id: u32,
}

impl RtmpHeader {
    pub fn new(
        timestamp: u32,
        message_length: u32,
        message_type: u8,
        message_stream_id: u32,
        chunk_stream_id: u32,
    ) -> Self {
        RtmpHeader {
            timestamp,
            message_length,
            message_type,
            message_stream_id,
            chunk_stream_id,
        }
    }

    /// Header for a protocol control message (chunk stream 2, stream id 0)
    pub fn control(message_type: u8, length: u32) -> Self {
        RtmpHeader::new(0, length, message_type, 0, CHUNK_STREAM_CONTROL)
    }

    /// Header for a command message on the command channel
    pub fn command(length: u32, stream_id: u32) -> Self {
        RtmpHeader::new(0, length, MSG_TYPE_COMMAND_AMF0, stream_id, CHUNK_STREAM_COMMAND)
    }

    /// Header for an AMF0 data message on the media channel
    pub fn data(timestamp: u32, length: u32, stream_id: u32) -> Self {
        RtmpHeader::new(timestamp, length, MSG_TYPE_DATA_AMF0, stream_id, CHUNK_STREAM_MEDIA)
    }

    /// Header for an audio message
    pub fn audio(timestamp: u32, length: u32, stream_id: u32) -> Self {
        RtmpHeader::new(timestamp, length, MSG_TYPE_AUDIO, stream_id, CHUNK_STREAM_MEDIA)
    }

    /// Header for a video message
    pub fn video(timestamp: u32, length: u32, stream_id: u32) -> Self {
        RtmpHeader::new(timestamp, length, MSG_TYPE_VIDEO, stream_id, CHUNK_STREAM_MEDIA)
    }

    /// Check if timestamp needs the extended field (>= 0xFFFFFF)
    pub fn has_extended_timestamp(&self) -> bool {
        self.timestamp >= 0xFFFFFF
    }
}
