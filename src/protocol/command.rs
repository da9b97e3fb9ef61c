use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Properties, Amf0Value};
use crate::ByteBuffer;
use crate::{Error, Result};

/// Identifies the Flash Media Live Encoder the original publisher imitates
pub const FLASH_VER: &str = "FMLE/3.0 (compatible; FMSc/1.0)";

#[derive(Debug, Clone)]
pub struct RtmpCommand {
    pub name: String,
    pub transaction_id: f64,
    /// Ordered arguments; the first is conventionally the command object or Null
    pub args: Vec<Amf0Value>,
}

impl RtmpCommand {
    pub fn new(name: impl Into<String>, transaction_id: f64) -> Self {
        RtmpCommand {
            name: name.into(),
            transaction_id,
            args: Vec::new(),
        }
    }

    /// Create connect command; swfUrl and tcUrl both carry the target URL
    pub fn connect(transaction_id: f64, app: &str, tc_url: &str) -> Self {
        let mut cmd = RtmpCommand::new("connect", transaction_id);

        let mut obj = Amf0Properties::new();
        obj.set("app", Amf0Value::string(app));
        obj.set("type", Amf0Value::string("nonprivate"));
        obj.set("flashVer", Amf0Value::string(FLASH_VER));
        obj.set("swfUrl", Amf0Value::string(tc_url));
        obj.set("tcUrl", Amf0Value::string(tc_url));
        cmd.args.push(obj.into_object());
        cmd
    }

    /// Create releaseStream command
    pub fn release_stream(transaction_id: f64, stream_name: &str) -> Self {
        let mut cmd = RtmpCommand::new("releaseStream", transaction_id);
        cmd.args.push(Amf0Value::Null);
        cmd.args.push(Amf0Value::string(stream_name));
        cmd
    }

    /// Create FCPublish command
    pub fn fc_publish(transaction_id: f64, stream_name: &str) -> Self {
        let mut cmd = RtmpCommand::new("FCPublish", transaction_id);
        cmd.args.push(Amf0Value::Null);
        cmd.args.push(Amf0Value::string(stream_name));
        cmd
    }

    /// Create createStream command
    pub fn create_stream(transaction_id: f64) -> Self {
        let mut cmd = RtmpCommand::new("createStream", transaction_id);
        cmd.args.push(Amf0Value::Null);
        cmd
    }

    /// Create publish command ("live" publishing type)
    pub fn publish(transaction_id: f64, stream_name: &str) -> Self {
        let mut cmd = RtmpCommand::new("publish", transaction_id);
        cmd.args.push(Amf0Value::Null);
        cmd.args.push(Amf0Value::string(stream_name));
        cmd.args.push(Amf0Value::string("live"));
        cmd
    }

    /// The "code" string of the reply information object, if present.
    /// Both _result and onStatus carry it in the second argument.
    pub fn reply_code(&self) -> Option<&str> {
        self.args
            .get(1)
            .and_then(|info| info.get_property("code"))
            .and_then(|code| code.as_string())
    }

    /// Encode command to bytes: name, transaction id, then arguments
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut encoder = Amf0Encoder::new();

        encoder.encode(&Amf0Value::String(self.name.clone()))?;
        encoder.encode(&Amf0Value::Number(self.transaction_id))?;
        for arg in &self.args {
            encoder.encode(arg)?;
        }

        Ok(encoder.get_bytes())
    }

    /// Decode command from a message body
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut buffer = ByteBuffer::new(data.to_vec());
        let mut decoder = Amf0Decoder::new(&mut buffer);

        let name_val = decoder.decode()?;
        let name = name_val
            .as_string()
            .ok_or_else(|| Error::amf_decode("Command name must be string"))?
            .to_string();

        let tid_val = decoder.decode()?;
        let transaction_id = tid_val
            .as_number()
            .ok_or_else(|| Error::amf_decode("Transaction ID must be number"))?;

        let mut args = Vec::new();
        while decoder.has_remaining() {
            args.push(decoder.decode()?);
        }

        Ok(RtmpCommand {
            name,
            transaction_id,
            args,
        })
    }
}
