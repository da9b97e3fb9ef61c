/// AMF0 data types used by RTMP command and data messages.
///
/// Objects and ECMA arrays keep their properties as ordered pairs so that
/// serialization preserves insertion order; the RTMP metadata consumers on
/// the server side are order-sensitive in practice.
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    Number(f64),                           // 0x00
    Boolean(bool),                         // 0x01
    String(String),                        // 0x02
    Object(Vec<(String, Amf0Value)>),      // 0x03
    Null,                                  // 0x05
    EcmaArray(Vec<(String, Amf0Value)>),   // 0x08 (for metadata)
    LongString(String),                    // 0x0C
}

// AMF0 type markers
pub mod markers {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02; // up to 65535 bytes
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const ECMA_ARRAY: u8 = 0x08; // associative array (metadata)
    pub const OBJECT_END: u8 = 0x09; // terminator after the empty key
    pub const LONG_STRING: u8 = 0x0C; // strings > 65535 bytes
}

impl Amf0Value {
    /// Build a string value, picking the long-string encoding when needed
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.len() > u16::MAX as usize {
            Amf0Value::LongString(value)
        } else {
            Amf0Value::String(value)
        }
    }

    /// Extract number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string reference
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) | Amf0Value::LongString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract boolean value
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract object / ECMA array property pairs
    pub fn as_pairs(&self) -> Option<&[(String, Amf0Value)]> {
        match self {
            Amf0Value::Object(pairs) | Amf0Value::EcmaArray(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Get property from object by key
    pub fn get_property(&self, key: &str) -> Option<&Amf0Value> {
        self.as_pairs()
            .and_then(|pairs| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    /// Check if null
    pub fn is_null(&self) -> bool {
        matches!(self, Amf0Value::Null)
    }
}

/// Ordered property-list builder shared by Object and EcmaArray construction
#[derive(Debug, Clone, Default)]
pub struct Amf0Properties {
    pairs: Vec<(String, Amf0Value)>,
}

impl Amf0Properties {
    pub fn new() -> Self {
        Amf0Properties { pairs: Vec::new() }
    }

    /// Insert or replace a property, keeping first-insertion order
    pub fn set(&mut self, key: impl Into<String>, value: Amf0Value) {
        let key = key.into();
        if let Some(existing) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    pub fn into_object(self) -> Amf0Value {
        Amf0Value::Object(self.pairs)
    }

    pub fn into_ecma_array(self) -> Amf0Value {
        Amf0Value::EcmaArray(self.pairs)
    }
}
