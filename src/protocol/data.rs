use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Value};
use crate::ByteBuffer;
use crate::{Error, Result};

/// AMF0 data message (metadata notifications such as @setDataFrame)
#[derive(Debug, Clone)]
pub struct RtmpData {
    pub name: String,
    pub values: Vec<Amf0Value>,
}

impl RtmpData {
    pub fn new(name: impl Into<String>) -> Self {
        RtmpData {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Create the @setDataFrame("onMetaData", properties) notification
    pub fn set_data_frame(properties: Amf0Value) -> Self {
        let mut data = RtmpData::new("@setDataFrame");
        data.values.push(Amf0Value::string("onMetaData"));
        data.values.push(properties);
        data
    }

    /// Encode data message to bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut encoder = Amf0Encoder::new();

        encoder.encode(&Amf0Value::String(self.name.clone()))?;
        for value in &self.values {
            encoder.encode(value)?;
        }

        Ok(encoder.get_bytes())
    }

    /// Decode data message from bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut buffer = ByteBuffer::new(data.to_vec());
        let mut decoder = Amf0Decoder::new(&mut buffer);

        let name_val = decoder.decode()?;
        let name = name_val
            .as_string()
            .ok_or_else(|| Error::amf_decode("Data name must be string"))?
            .to_string();

        let mut values = Vec::new();
        while decoder.has_remaining() {
            values.push(decoder.decode()?);
        }

        Ok(RtmpData { name, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::Amf0Properties;

    #[test]
    fn test_set_data_frame_shape() {
        let mut props = Amf0Properties::new();
        props.set("width", Amf0Value::Number(1280.0));

        let data = RtmpData::set_data_frame(props.into_ecma_array());
        assert_eq!(data.name, "@setDataFrame");
        assert_eq!(data.values[0].as_string(), Some("onMetaData"));
        assert!(matches!(data.values[1], Amf0Value::EcmaArray(_)));
    }

    #[test]
    fn test_data_round_trip() {
        let mut props = Amf0Properties::new();
        props.set("framerate", Amf0Value::Number(30.0));
        let original = RtmpData::set_data_frame(props.into_ecma_array());

        let decoded = RtmpData::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded.name, "@setDataFrame");
        assert_eq!(decoded.values.len(), 2);
        assert_eq!(
            decoded.values[1].get_property("framerate").and_then(|v| v.as_number()),
            Some(30.0)
        );
    }
}
