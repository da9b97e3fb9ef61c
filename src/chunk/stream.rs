use crate::protocol::{RtmpHeader, RtmpPacket};

/// Per-channel chunk stream state: the previously seen header for delta
/// compression plus the partial-message reassembly buffer.
#[derive(Debug, Clone, Default)]
pub struct ChunkStreamContext {
    /// Previous header received on this chunk stream
    pub prev_header: Option<RtmpHeader>,

    /// Partial message being assembled
    message_buffer: Vec<u8>,

    /// Bytes still missing for the current message
    bytes_remaining: usize,

    /// Header of the message being assembled
    current_header: Option<RtmpHeader>,
}

impl ChunkStreamContext {
    pub fn new() -> Self {
        ChunkStreamContext::default()
    }

    /// Check if currently assembling a message
    pub fn is_assembling(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Bytes still expected for the message in progress
    pub fn bytes_remaining(&self) -> usize {
        self.bytes_remaining
    }

    /// Begin a new message; the reassembly buffer starts empty
    pub fn start_message(&mut self, header: RtmpHeader) {
        self.bytes_remaining = header.message_length as usize;
        self.current_header = Some(header);
        self.prev_header = Some(header);
        self.message_buffer.clear();
        self.message_buffer.reserve(self.bytes_remaining);
    }

    /// Append one chunk of body data; returns the complete packet the moment
    /// the accumulated length reaches the expected message length.
    pub fn add_chunk_data(&mut self, data: &[u8]) -> Option<RtmpPacket> {
        self.message_buffer.extend_from_slice(data);

        if data.len() >= self.bytes_remaining {
            self.bytes_remaining = 0;
            if let Some(header) = self.current_header.take() {
                let payload = std::mem::take(&mut self.message_buffer);
                self.prev_header = Some(header);
                return Some(RtmpPacket::new(header, payload));
            }
        } else {
            self.bytes_remaining -= data.len();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MSG_TYPE_VIDEO;

    #[test]
    fn test_single_chunk_message() {
        let mut ctx = ChunkStreamContext::new();
        ctx.start_message(RtmpHeader::new(0, 3, MSG_TYPE_VIDEO, 1, 5));

        let packet = ctx.add_chunk_data(&[1, 2, 3]).expect("complete packet");
        assert_eq!(packet.payload, vec![1, 2, 3]);
        assert!(!ctx.is_assembling());
    }

    #[test]
    fn test_buffer_cleared_on_completion() {
        let mut ctx = ChunkStreamContext::new();
        ctx.start_message(RtmpHeader::new(0, 4, MSG_TYPE_VIDEO, 1, 5));

        assert!(ctx.add_chunk_data(&[1, 2]).is_none());
        assert!(ctx.is_assembling());
        assert_eq!(ctx.bytes_remaining(), 2);

        let packet = ctx.add_chunk_data(&[3, 4]).unwrap();
        assert_eq!(packet.payload, vec![1, 2, 3, 4]);

        // Next message starts from an empty buffer
        ctx.start_message(RtmpHeader::new(0, 1, MSG_TYPE_VIDEO, 1, 5));
        let packet = ctx.add_chunk_data(&[9]).unwrap();
        assert_eq!(packet.payload, vec![9]);
    }
}
