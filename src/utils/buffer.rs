use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Error as IoError, ErrorKind, Result as IoResult};

pub struct ByteBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl ByteBuffer {
    /// Create a new ByteBuffer from bytes
    pub fn new(data: Vec<u8>) -> Self {
        ByteBuffer {
            buffer: data,
            cursor: 0,
        }
    }

    /// Create an empty ByteBuffer with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Get remaining bytes from current position
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Check if buffer has at least n bytes remaining
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Read bytes into a new Vec
    pub fn read_bytes(&mut self, len: usize) -> IoResult<Vec<u8>> {
        if !self.has_remaining(len) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let bytes = self.buffer[self.cursor..self.cursor + len].to_vec();
        self.cursor += len;
        Ok(bytes)
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, data: &[u8]) -> IoResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Read u8
    pub fn read_u8(&mut self) -> IoResult<u8> {
        if !self.has_remaining(1) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let value = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(value)
    }

    /// Write u8
    pub fn write_u8(&mut self, value: u8) -> IoResult<()> {
        self.buffer.push(value);
        Ok(())
    }

    /// Read u16 (big endian)
    pub fn read_u16_be(&mut self) -> IoResult<u16> {
        if !self.has_remaining(2) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let mut cursor = Cursor::new(&self.buffer[self.cursor..]);
        let value = cursor.read_u16::<BigEndian>()?;
        self.cursor += 2;
        Ok(value)
    }

    /// Write u16 (big endian)
    pub fn write_u16_be(&mut self, value: u16) -> IoResult<()> {
        let mut bytes = vec![];
        bytes.write_u16::<BigEndian>(value)?;
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }

    /// Read u24 (big endian) - chunk header timestamp and length fields
    pub fn read_u24_be(&mut self) -> IoResult<u32> {
        if !self.has_remaining(3) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let b = &self.buffer[self.cursor..self.cursor + 3];
        let value = u32::from_be_bytes([0, b[0], b[1], b[2]]);
        self.cursor += 3;
        Ok(value)
    }

    /// Write u24 (big endian); the top byte of the value is discarded
    pub fn write_u24_be(&mut self, value: u32) -> IoResult<()> {
        self.buffer.push((value >> 16) as u8);
        self.buffer.push((value >> 8) as u8);
        self.buffer.push(value as u8);
        Ok(())
    }

    /// Read u32 (big endian)
    pub fn read_u32_be(&mut self) -> IoResult<u32> {
        if !self.has_remaining(4) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let mut cursor = Cursor::new(&self.buffer[self.cursor..]);
        let value = cursor.read_u32::<BigEndian>()?;
        self.cursor += 4;
        Ok(value)
    }

    /// Write u32 (big endian)
    pub fn write_u32_be(&mut self, value: u32) -> IoResult<()> {
        let mut bytes = vec![];
        bytes.write_u32::<BigEndian>(value)?;
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }

    /// Read u32 (little endian) - message stream id on the wire
    pub fn read_u32_le(&mut self) -> IoResult<u32> {
        if !self.has_remaining(4) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let b = &self.buffer[self.cursor..self.cursor + 4];
        let value = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        self.cursor += 4;
        Ok(value)
    }

    /// Write u32 (little endian)
    pub fn write_u32_le(&mut self, value: u32) -> IoResult<()> {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Read f64 (big endian)
    pub fn read_f64_be(&mut self) -> IoResult<f64> {
        if !self.has_remaining(8) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let mut cursor = Cursor::new(&self.buffer[self.cursor..]);
        let value = cursor.read_f64::<BigEndian>()?;
        self.cursor += 8;
        Ok(value)
    }

    /// Write f64 (big endian)
    pub fn write_f64_be(&mut self, value: f64) -> IoResult<()> {
        let mut bytes = vec![];
        bytes.write_f64::<BigEndian>(value)?;
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }

    /// Get all bytes as Vec
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Get slice of underlying buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get length of buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
