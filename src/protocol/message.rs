use crate::protocol::constants::*;
use crate::protocol::{RtmpCommand, RtmpData, RtmpHeader, RtmpPacket};
use crate::{ByteBuffer, Result};

/// User control message events (message type 4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserControlEvent {
    StreamBegin(u32),
    StreamEof(u32),
    PingRequest(u32),
    PingResponse(u32),
    /// Unhandled event subtypes are kept verbatim
    Other { event_type: u16, data: Vec<u8> },
}

impl UserControlEvent {
    /// Build the pong reply echoing a ping's timestamp payload
    pub fn pong_for(ping_timestamp: u32) -> Self {
        UserControlEvent::PingResponse(ping_timestamp)
    }
}

/// One RTMP message with its payload decoded.
///
/// Control variants carry their parsed fields; Audio/Video/Metadata carry the
/// raw FLV-style tag bytes untouched.
#[derive(Debug, Clone)]
pub enum RtmpMessage {
    SetChunkSize(u32),
    Abort(u32),
    Acknowledgement(u32),
    WindowAckSize(u32),
    SetPeerBandwidth(u32, u8),
    UserControl(UserControlEvent),
    Command(RtmpCommand),
    Data(RtmpData),
    Audio(Vec<u8>),
    Video(Vec<u8>),
    Metadata(Vec<u8>),
    /// A well-formed message of a type this crate has no handling for
    Unknown { message_type: u8, payload: Vec<u8> },
}

impl RtmpMessage {
    pub fn message_type(&self) -> u8 {
        match self {
            RtmpMessage::SetChunkSize(_) => MSG_TYPE_SET_CHUNK_SIZE,
            RtmpMessage::Abort(_) => MSG_TYPE_ABORT,
            RtmpMessage::Acknowledgement(_) => MSG_TYPE_ACK,
            RtmpMessage::WindowAckSize(_) => MSG_TYPE_WINDOW_ACK,
            RtmpMessage::SetPeerBandwidth(..) => MSG_TYPE_SET_PEER_BW,
            RtmpMessage::UserControl(_) => MSG_TYPE_USER_CONTROL,
            RtmpMessage::Command(_) => MSG_TYPE_COMMAND_AMF0,
            RtmpMessage::Data(_) => MSG_TYPE_DATA_AMF0,
            RtmpMessage::Audio(_) => MSG_TYPE_AUDIO,
            RtmpMessage::Video(_) => MSG_TYPE_VIDEO,
            RtmpMessage::Metadata(_) => MSG_TYPE_DATA_AMF0,
            RtmpMessage::Unknown { message_type, .. } => *message_type,
        }
    }

    /// Chunk stream a message of this kind is sent on
    pub fn chunk_stream_id(&self) -> u32 {
        match self {
            RtmpMessage::SetChunkSize(_)
            | RtmpMessage::Abort(_)
            | RtmpMessage::Acknowledgement(_)
            | RtmpMessage::WindowAckSize(_)
            | RtmpMessage::SetPeerBandwidth(..)
            | RtmpMessage::UserControl(_)
            | RtmpMessage::Unknown { .. } => CHUNK_STREAM_CONTROL,
            RtmpMessage::Command(_) => CHUNK_STREAM_COMMAND,
            RtmpMessage::Data(_)
            | RtmpMessage::Audio(_)
            | RtmpMessage::Video(_)
            | RtmpMessage::Metadata(_) => CHUNK_STREAM_MEDIA,
        }
    }

    /// Serialize the message body
    pub fn encode_payload(&self) -> Result<Vec<u8>> {
        match self {
            RtmpMessage::SetChunkSize(size)
            | RtmpMessage::Abort(size)
            | RtmpMessage::Acknowledgement(size)
            | RtmpMessage::WindowAckSize(size) => {
                let mut buffer = ByteBuffer::with_capacity(4);
                buffer.write_u32_be(*size)?;
                Ok(buffer.to_vec())
            }
            RtmpMessage::SetPeerBandwidth(size, limit_type) => {
                let mut buffer = ByteBuffer::with_capacity(5);
                buffer.write_u32_be(*size)?;
                buffer.write_u8(*limit_type)?;
                Ok(buffer.to_vec())
            }
            RtmpMessage::UserControl(event) => encode_user_control(event),
            RtmpMessage::Command(command) => command.encode(),
            RtmpMessage::Data(data) => data.encode(),
            RtmpMessage::Audio(bytes) | RtmpMessage::Video(bytes) | RtmpMessage::Metadata(bytes) => {
                Ok(bytes.clone())
            }
            RtmpMessage::Unknown { payload, .. } => Ok(payload.clone()),
        }
    }

    /// Serialize into a packet ready for chunking
    pub fn into_packet(self, timestamp: u32, message_stream_id: u32) -> Result<RtmpPacket> {
        let payload = self.encode_payload()?;
        let header = RtmpHeader::new(
            timestamp,
            payload.len() as u32,
            self.message_type(),
            message_stream_id,
            self.chunk_stream_id(),
        );
        Ok(RtmpPacket::new(header, payload))
    }

    /// Parse a reassembled packet body by message type
    pub fn decode(packet: &RtmpPacket) -> Result<RtmpMessage> {
        let mut buffer = ByteBuffer::new(packet.payload.clone());
        match packet.message_type() {
            MSG_TYPE_SET_CHUNK_SIZE => Ok(RtmpMessage::SetChunkSize(buffer.read_u32_be()?)),
            MSG_TYPE_ABORT => Ok(RtmpMessage::Abort(buffer.read_u32_be()?)),
            MSG_TYPE_ACK => Ok(RtmpMessage::Acknowledgement(buffer.read_u32_be()?)),
            MSG_TYPE_WINDOW_ACK => Ok(RtmpMessage::WindowAckSize(buffer.read_u32_be()?)),
            MSG_TYPE_SET_PEER_BW => {
                let size = buffer.read_u32_be()?;
                let limit_type = buffer.read_u8()?;
                Ok(RtmpMessage::SetPeerBandwidth(size, limit_type))
            }
            MSG_TYPE_USER_CONTROL => Ok(RtmpMessage::UserControl(decode_user_control(&mut buffer)?)),
            MSG_TYPE_COMMAND_AMF0 => Ok(RtmpMessage::Command(RtmpCommand::decode(&packet.payload)?)),
            MSG_TYPE_DATA_AMF0 => Ok(RtmpMessage::Data(RtmpData::decode(&packet.payload)?)),
            MSG_TYPE_AUDIO => Ok(RtmpMessage::Audio(packet.payload.clone())),
            MSG_TYPE_VIDEO => Ok(RtmpMessage::Video(packet.payload.clone())),
            // Types without a body implementation are carried verbatim so
            // the receiver can skip them instead of failing the stream
            other => Ok(RtmpMessage::Unknown {
                message_type: other,
                payload: packet.payload.clone(),
            }),
        }
    }
}

fn encode_user_control(event: &UserControlEvent) -> Result<Vec<u8>> {
    let mut buffer = ByteBuffer::with_capacity(6);
    match event {
        UserControlEvent::StreamBegin(stream_id) => {
            buffer.write_u16_be(USER_CONTROL_STREAM_BEGIN)?;
            buffer.write_u32_be(*stream_id)?;
        }
        UserControlEvent::StreamEof(stream_id) => {
            buffer.write_u16_be(USER_CONTROL_STREAM_EOF)?;
            buffer.write_u32_be(*stream_id)?;
        }
        UserControlEvent::PingRequest(timestamp) => {
            buffer.write_u16_be(USER_CONTROL_PING_REQUEST)?;
            buffer.write_u32_be(*timestamp)?;
        }
        UserControlEvent::PingResponse(timestamp) => {
            buffer.write_u16_be(USER_CONTROL_PING_RESPONSE)?;
            buffer.write_u32_be(*timestamp)?;
        }
        UserControlEvent::Other { event_type, data } => {
            buffer.write_u16_be(*event_type)?;
            buffer.write_bytes(data)?;
        }
    }
    Ok(buffer.to_vec())
}

fn decode_user_control(buffer: &mut ByteBuffer) -> Result<UserControlEvent> {
    let event_type = buffer.read_u16_be()?;
    match event_type {
        USER_CONTROL_STREAM_BEGIN => Ok(UserControlEvent::StreamBegin(buffer.read_u32_be()?)),
        USER_CONTROL_STREAM_EOF => Ok(UserControlEvent::StreamEof(buffer.read_u32_be()?)),
        USER_CONTROL_PING_REQUEST => Ok(UserControlEvent::PingRequest(buffer.read_u32_be()?)),
        USER_CONTROL_PING_RESPONSE => Ok(UserControlEvent::PingResponse(buffer.read_u32_be()?)),
        _ => {
            let data = buffer.read_bytes(buffer.remaining())?;
            Ok(UserControlEvent::Other { event_type, data })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_chunk_size_round_trip() {
        let packet = RtmpMessage::SetChunkSize(4096).into_packet(0, 0).unwrap();
        assert_eq!(packet.payload, vec![0x00, 0x00, 0x10, 0x00]);
        assert_eq!(packet.header.chunk_stream_id, CHUNK_STREAM_CONTROL);

        match RtmpMessage::decode(&packet).unwrap() {
            RtmpMessage::SetChunkSize(size) => assert_eq!(size, 4096),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_ping_round_trip() {
        let packet = RtmpMessage::UserControl(UserControlEvent::PingRequest(0xABCD))
            .into_packet(0, 0)
            .unwrap();

        match RtmpMessage::decode(&packet).unwrap() {
            RtmpMessage::UserControl(UserControlEvent::PingRequest(ts)) => assert_eq!(ts, 0xABCD),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_pong_echoes_ping_timestamp() {
        let pong = UserControlEvent::pong_for(42);
        assert_eq!(pong, UserControlEvent::PingResponse(42));
    }

    #[test]
    fn test_acknowledgement_round_trip() {
        let packet = RtmpMessage::Acknowledgement(2_500_000).into_packet(0, 0).unwrap();
        assert_eq!(packet.message_type(), MSG_TYPE_ACK);

        match RtmpMessage::decode(&packet).unwrap() {
            RtmpMessage::Acknowledgement(sequence) => assert_eq!(sequence, 2_500_000),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_unhandled_message_type_carried_verbatim() {
        let packet = RtmpPacket::new(RtmpHeader::new(0, 3, 99, 0, 2), vec![1, 2, 3]);
        match RtmpMessage::decode(&packet).unwrap() {
            RtmpMessage::Unknown { message_type, payload } => {
                assert_eq!(message_type, 99);
                assert_eq!(payload, vec![1, 2, 3]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
