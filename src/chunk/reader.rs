use crate::chunk::ChunkStreamContext;
use crate::protocol::RtmpHeader;
use crate::protocol::RtmpPacket;
use crate::{Error, Result, DEFAULT_CHUNK_SIZE};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Reassembles incoming chunks into complete packets, one context per
/// chunk stream.
pub struct ChunkReader {
    /// Per-channel state for header decompression and reassembly
    chunk_streams: HashMap<u32, ChunkStreamContext>,

    /// Current chunk size for reading
    chunk_size_in: usize,
}

impl ChunkReader {
    pub fn new() -> Self {
        ChunkReader {
            chunk_streams: HashMap::new(),
            chunk_size_in: DEFAULT_CHUNK_SIZE as usize,
        }
    }

    /// Set incoming chunk size (after the peer's Set Chunk Size)
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size_in = size;
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size_in
    }

    /// Discard the partial message on a chunk stream (Abort message)
    pub fn abort(&mut self, chunk_stream_id: u32) {
        self.chunk_streams.remove(&chunk_stream_id);
    }

    /// Read chunks until one message completes. Blocks on the socket; a
    /// closed connection surfaces as an Io error.
    pub async fn read_packet<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut R,
    ) -> Result<RtmpPacket> {
        loop {
            if let Some(packet) = self.read_chunk(reader).await? {
                return Ok(packet);
            }
        }
    }

    /// Read exactly one chunk; returns the packet if it completed a message
    async fn read_chunk<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<RtmpPacket>> {
        let (fmt, cs_id) = read_basic_header(reader).await?;

        let context = self.chunk_streams.entry(cs_id).or_default();

        if context.is_assembling() {
            // Continuation of a split message; only type 3 is legal here
            if fmt != 3 {
                return Err(Error::chunk(format!(
                    "Chunk type {} interrupts message on stream {}",
                    fmt, cs_id
                )));
            }
        } else {
            let header = read_message_header(reader, fmt, cs_id, context.prev_header).await?;
            context.start_message(header);
        }

        let to_read = context.bytes_remaining().min(self.chunk_size_in);
        let mut data = vec![0u8; to_read];
        reader.read_exact(&mut data).await?;

        Ok(context.add_chunk_data(&data))
    }
}

impl Default for ChunkReader {
    fn default() -> Self {
        ChunkReader::new()
    }
}

/// Read the basic header: format bits and 1/2/3-byte chunk stream id
async fn read_basic_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(u8, u32)> {
    let first = reader.read_u8().await?;
    let fmt = first >> 6;
    let cs_id = (first & 0x3F) as u32;

    let cs_id = match cs_id {
        0 => {
            let second = reader.read_u8().await?;
            second as u32 + 64
        }
        1 => {
            let second = reader.read_u8().await?;
            let third = reader.read_u8().await?;
            (third as u32) * 256 + second as u32 + 64
        }
        _ => cs_id,
    };

    Ok((fmt, cs_id))
}

/// Read the message header per chunk type, filling omitted fields from the
/// channel's previous header.
async fn read_message_header<R: AsyncRead + Unpin>(
    reader: &mut R,
    fmt: u8,
    cs_id: u32,
    prev: Option<RtmpHeader>,
) -> Result<RtmpHeader> {
    match fmt {
        0 => {
            let mut bytes = [0u8; 11];
            reader.read_exact(&mut bytes).await?;

            let mut timestamp = read_u24(&bytes[0..3]);
            let message_length = read_u24(&bytes[3..6]);
            let message_type = bytes[6];
            let message_stream_id = u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]);

            if timestamp == 0xFFFFFF {
                timestamp = reader.read_u32().await?;
            }

            Ok(RtmpHeader::new(
                timestamp,
                message_length,
                message_type,
                message_stream_id,
                cs_id,
            ))
        }
        1 => {
            let prev = require_prev(prev, fmt, cs_id)?;
            let mut bytes = [0u8; 7];
            reader.read_exact(&mut bytes).await?;

            let mut delta = read_u24(&bytes[0..3]);
            let message_length = read_u24(&bytes[3..6]);
            let message_type = bytes[6];

            if delta == 0xFFFFFF {
                delta = reader.read_u32().await?;
            }

            Ok(RtmpHeader::new(
                prev.timestamp.wrapping_add(delta),
                message_length,
                message_type,
                prev.message_stream_id,
                cs_id,
            ))
        }
        2 => {
            let prev = require_prev(prev, fmt, cs_id)?;
            let mut bytes = [0u8; 3];
            reader.read_exact(&mut bytes).await?;

            let mut delta = read_u24(&bytes);
            if delta == 0xFFFFFF {
                delta = reader.read_u32().await?;
            }

            Ok(RtmpHeader::new(
                prev.timestamp.wrapping_add(delta),
                prev.message_length,
                prev.message_type,
                prev.message_stream_id,
                cs_id,
            ))
        }
        3 => {
            let prev = require_prev(prev, fmt, cs_id)?;
            Ok(prev)
        }
        _ => Err(Error::chunk(format!("Invalid chunk type {}", fmt))),
    }
}

fn require_prev(prev: Option<RtmpHeader>, fmt: u8, cs_id: u32) -> Result<RtmpHeader> {
    prev.ok_or_else(|| {
        Error::chunk(format!(
            "Chunk type {} on stream {} with no previous header",
            fmt, cs_id
        ))
    })
}

fn read_u24(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}
