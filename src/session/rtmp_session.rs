use crate::protocol::{DEFAULT_CHUNK_SIZE, DEFAULT_WINDOW_ACK_SIZE};
use crate::session::TimestampOrigin;
use std::collections::HashMap;

/// Negotiated per-connection state shared between the reader task and the
/// publisher front end.
#[derive(Debug)]
pub struct RtmpSession {
    /// Chunk size in effect for both directions
    pub chunk_size: u32,

    /// Window acknowledgement size announced by the server
    pub window_ack_size: u32,

    /// Message stream id returned by createStream; 0 until then
    pub stream_id: u32,

    /// Media timestamp rebasing state
    pub timestamp_origin: TimestampOrigin,

    /// Next transaction id to hand out
    next_transaction_id: u32,

    /// Commands awaiting a reply, keyed by transaction id
    invoked_commands: HashMap<u32, String>,
}

impl RtmpSession {
    pub fn new() -> Self {
        RtmpSession {
            chunk_size: DEFAULT_CHUNK_SIZE,
            window_ack_size: DEFAULT_WINDOW_ACK_SIZE,
            stream_id: 0,
            timestamp_origin: TimestampOrigin::new(),
            next_transaction_id: 1,
            invoked_commands: HashMap::new(),
        }
    }

    /// Allocate a transaction id and remember the command name for
    /// correlating the reply. The first id handed out is 1.
    pub fn register_command(&mut self, name: impl Into<String>) -> u32 {
        let tid = self.next_transaction_id;
        self.next_transaction_id += 1;
        self.invoked_commands.insert(tid, name.into());
        tid
    }

    /// Consume the pending command for a reply's transaction id
    pub fn take_command(&mut self, transaction_id: u32) -> Option<String> {
        self.invoked_commands.remove(&transaction_id)
    }

    pub fn pending_commands(&self) -> usize {
        self.invoked_commands.len()
    }
}

impl Default for RtmpSession {
    fn default() -> Self {
        RtmpSession::new()
    }
}
