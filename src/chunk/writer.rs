use crate::protocol::{RtmpHeader, RtmpPacket};
use crate::{ByteBuffer, Error, Result, DEFAULT_CHUNK_SIZE};
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Splits outgoing packets into chunks, compressing headers against the
/// previous header sent on each chunk stream.
pub struct ChunkWriter {
    /// Previous headers by chunk stream id
    prev_headers: HashMap<u32, RtmpHeader>,

    /// Current chunk size for writing
    chunk_size_out: usize,
}

impl ChunkWriter {
    pub fn new() -> Self {
        ChunkWriter {
            prev_headers: HashMap::new(),
            chunk_size_out: DEFAULT_CHUNK_SIZE as usize,
        }
    }

    /// Set outgoing chunk size
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size_out = size;
    }

    /// Write packet as chunks and flush
    pub async fn write_packet<W: AsyncWrite + Unpin>(
        &mut self,
        packet: &RtmpPacket,
        writer: &mut W,
    ) -> Result<()> {
        let chunks = self.create_chunks(packet)?;

        writer
            .write_all(&chunks)
            .await
            .map_err(|e| Error::chunk(format!("Failed to write chunks: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| Error::chunk(format!("Failed to flush: {}", e)))?;

        Ok(())
    }

    /// Serialize a packet to its full chunked wire image, updating the
    /// channel's cached header.
    pub fn create_chunks(&mut self, packet: &RtmpPacket) -> Result<Vec<u8>> {
        let cs_id = packet.header.chunk_stream_id;
        let mut result = Vec::with_capacity(packet.payload.len() + 18);

        // First chunk: basic header + compressed message header
        let (fmt, header_bytes) = self.encode_message_header(packet)?;
        result.extend_from_slice(&encode_basic_header(fmt, cs_id));
        result.extend_from_slice(&header_bytes);

        let payload_len = packet.payload.len();
        let first_chunk_size = payload_len.min(self.chunk_size_out);
        result.extend_from_slice(&packet.payload[0..first_chunk_size]);

        // Continuation chunks carry only a type 3 basic header byte
        let mut offset = first_chunk_size;
        while offset < payload_len {
            result.extend_from_slice(&encode_basic_header(3, cs_id));

            let chunk_end = (offset + self.chunk_size_out).min(payload_len);
            result.extend_from_slice(&packet.payload[offset..chunk_end]);
            offset = chunk_end;
        }

        self.prev_headers.insert(cs_id, packet.header);
        Ok(result)
    }

    /// Chunk type the next packet on this channel would be sent with
    pub fn select_chunk_type(&self, header: &RtmpHeader) -> u8 {
        match self.prev_headers.get(&header.chunk_stream_id) {
            Some(prev) if header.timestamp >= prev.timestamp => {
                if prev.message_stream_id != header.message_stream_id {
                    0
                } else if prev.message_type == header.message_type
                    && prev.message_length == header.message_length
                {
                    if header.timestamp == prev.timestamp {
                        3
                    } else {
                        2
                    }
                } else {
                    1
                }
            }
            // Timestamp moved backwards: only an absolute header can express it
            _ => 0,
        }
    }

    /// Encode the message header portion, picking the most compact type
    fn encode_message_header(&self, packet: &RtmpPacket) -> Result<(u8, Vec<u8>)> {
        let fmt = self.select_chunk_type(&packet.header);
        let prev = self.prev_headers.get(&packet.header.chunk_stream_id);

        let bytes = match fmt {
            0 => encode_type0_header(&packet.header)?,
            1 | 2 => {
                let prev = prev.ok_or_else(|| Error::chunk("Delta header without previous"))?;
                let delta = packet.header.timestamp - prev.timestamp;
                if fmt == 1 {
                    encode_type1_header(delta, &packet.header)?
                } else {
                    encode_type2_header(delta)?
                }
            }
            _ => Vec::new(),
        };

        Ok((fmt, bytes))
    }
}

/// Encode basic header: 1, 2 or 3 bytes depending on the chunk stream id
pub fn encode_basic_header(fmt: u8, cs_id: u32) -> Vec<u8> {
    let mut result = Vec::with_capacity(3);

    if cs_id <= 63 {
        result.push((fmt << 6) | (cs_id as u8));
    } else if cs_id <= 319 {
        result.push(fmt << 6);
        result.push((cs_id - 64) as u8);
    } else {
        result.push((fmt << 6) | 1);
        let id = cs_id - 64;
        result.push((id & 0xFF) as u8);
        result.push((id >> 8) as u8);
    }

    result
}

/// Type 0: absolute timestamp, length, type, stream id (11 bytes + ext ts)
fn encode_type0_header(header: &RtmpHeader) -> Result<Vec<u8>> {
    let mut buffer = ByteBuffer::with_capacity(15);

    if header.has_extended_timestamp() {
        buffer.write_u24_be(0xFFFFFF)?;
    } else {
        buffer.write_u24_be(header.timestamp)?;
    }
    buffer.write_u24_be(header.message_length)?;
    buffer.write_u8(header.message_type)?;
    buffer.write_u32_le(header.message_stream_id)?;
    if header.has_extended_timestamp() {
        buffer.write_u32_be(header.timestamp)?;
    }

    Ok(buffer.to_vec())
}

/// Type 1: timestamp delta, length, type (7 bytes + ext ts)
fn encode_type1_header(timestamp_delta: u32, header: &RtmpHeader) -> Result<Vec<u8>> {
    let mut buffer = ByteBuffer::with_capacity(11);

    if timestamp_delta >= 0xFFFFFF {
        buffer.write_u24_be(0xFFFFFF)?;
    } else {
        buffer.write_u24_be(timestamp_delta)?;
    }
    buffer.write_u24_be(header.message_length)?;
    buffer.write_u8(header.message_type)?;
    if timestamp_delta >= 0xFFFFFF {
        buffer.write_u32_be(timestamp_delta)?;
    }

    Ok(buffer.to_vec())
}

/// Type 2: timestamp delta only (3 bytes + ext ts)
fn encode_type2_header(timestamp_delta: u32) -> Result<Vec<u8>> {
    let mut buffer = ByteBuffer::with_capacity(7);

    if timestamp_delta >= 0xFFFFFF {
        buffer.write_u24_be(0xFFFFFF)?;
        buffer.write_u32_be(timestamp_delta)?;
    } else {
        buffer.write_u24_be(timestamp_delta)?;
    }

    Ok(buffer.to_vec())
}
