use crate::amf::amf0::{markers, Amf0Value};
use crate::ByteBuffer;
use crate::Result;

pub struct Amf0Encoder {
    buffer: ByteBuffer,
}

impl Amf0Encoder {
    pub fn new() -> Self {
        Amf0Encoder {
            buffer: ByteBuffer::with_capacity(1024),
        }
    }

    pub fn encode(&mut self, value: &Amf0Value) -> Result<()> {
        match value {
            Amf0Value::Number(n) => self.encode_number(*n),
            Amf0Value::Boolean(b) => self.encode_boolean(*b),
            Amf0Value::String(s) => self.encode_string(s),
            Amf0Value::Object(pairs) => self.encode_object(pairs),
            Amf0Value::Null => self.encode_null(),
            Amf0Value::EcmaArray(pairs) => self.encode_ecma_array(pairs),
            Amf0Value::LongString(s) => self.encode_long_string(s),
        }
    }

    fn encode_number(&mut self, value: f64) -> Result<()> {
        self.buffer.write_u8(markers::NUMBER)?;
        self.buffer.write_f64_be(value)?;
        Ok(())
    }

    fn encode_boolean(&mut self, value: bool) -> Result<()> {
        self.buffer.write_u8(markers::BOOLEAN)?;
        self.buffer.write_u8(if value { 1 } else { 0 })?;
        Ok(())
    }

    fn encode_string(&mut self, value: &str) -> Result<()> {
        self.buffer.write_u8(markers::STRING)?;
        let bytes = value.as_bytes();
        self.buffer.write_u16_be(bytes.len() as u16)?;
        self.buffer.write_bytes(bytes)?;
        Ok(())
    }

    fn encode_object(&mut self, pairs: &[(String, Amf0Value)]) -> Result<()> {
        self.buffer.write_u8(markers::OBJECT)?;
        for (key, value) in pairs {
            self.write_string_no_marker(key)?;
            self.encode(value)?;
        }
        // Empty key plus object end marker
        self.buffer.write_u16_be(0)?;
        self.buffer.write_u8(markers::OBJECT_END)?;
        Ok(())
    }

    fn encode_null(&mut self) -> Result<()> {
        self.buffer.write_u8(markers::NULL)?;
        Ok(())
    }

    fn encode_ecma_array(&mut self, pairs: &[(String, Amf0Value)]) -> Result<()> {
        self.buffer.write_u8(markers::ECMA_ARRAY)?;
        self.buffer.write_u32_be(pairs.len() as u32)?;
        for (key, value) in pairs {
            self.write_string_no_marker(key)?;
            self.encode(value)?;
        }
        // Same terminator as a plain object
        self.buffer.write_u16_be(0)?;
        self.buffer.write_u8(markers::OBJECT_END)?;
        Ok(())
    }

    fn encode_long_string(&mut self, value: &str) -> Result<()> {
        self.buffer.write_u8(markers::LONG_STRING)?;
        let bytes = value.as_bytes();
        self.buffer.write_u32_be(bytes.len() as u32)?;
        self.buffer.write_bytes(bytes)?;
        Ok(())
    }

    /// Helper to write string without type marker (for object keys)
    fn write_string_no_marker(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.buffer.write_u16_be(bytes.len() as u16)?;
        self.buffer.write_bytes(bytes)?;
        Ok(())
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        self.buffer.to_vec()
    }
}
