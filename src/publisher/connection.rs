use crate::chunk::ChunkReader;
use crate::protocol::{
    RtmpCommand, RtmpMessage, UserControlEvent, CODE_CONNECT_SUCCESS, CODE_PUBLISH_START,
    MIN_CHUNK_SIZE,
};
use crate::publisher::{OutboundJob, PublishErrorKind, PublisherListener, PublisherState};
use crate::session::RtmpSession;
use crate::{Error, Result};
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, RwLock};

/// State shared between the reader task, the writer task and the
/// publisher front end for one connection.
pub(crate) struct ConnectionShared {
    pub state: Arc<RwLock<PublisherState>>,
    pub session: Arc<RwLock<RtmpSession>>,
    pub listener: Arc<dyn PublisherListener>,
    pub tx: mpsc::Sender<OutboundJob>,
    pub stream_name: String,

    /// Set once the fatal error for this connection has been reported
    fatal_reported: AtomicBool,

    /// Set once on_init_complete has fired
    init_notified: AtomicBool,
}

impl ConnectionShared {
    pub fn new(
        state: Arc<RwLock<PublisherState>>,
        session: Arc<RwLock<RtmpSession>>,
        listener: Arc<dyn PublisherListener>,
        tx: mpsc::Sender<OutboundJob>,
        stream_name: String,
    ) -> Self {
        ConnectionShared {
            state,
            session,
            listener,
            tx,
            stream_name,
            fatal_reported: AtomicBool::new(false),
            init_notified: AtomicBool::new(false),
        }
    }

    /// Move to Fail and notify the listener. Reported at most once per
    /// connection; later failures are logged only.
    pub async fn report_fatal(&self, kind: PublishErrorKind, detail: impl Into<String>) {
        let detail = detail.into();
        if self.fatal_reported.swap(true, Ordering::SeqCst) {
            debug!("Suppressing {} after earlier fatal error: {}", kind, detail);
            return;
        }

        warn!("Connection failed with {}: {}", kind, detail);
        {
            let mut state = self.state.write().await;
            *state = PublisherState::Fail;
        }
        self.listener.on_error(kind, detail).await;
    }

    /// Serialize a message and push it onto the write queue
    pub async fn enqueue(
        &self,
        message: RtmpMessage,
        timestamp: u32,
        stream_id: u32,
        on_fail: PublishErrorKind,
    ) -> Result<()> {
        let packet = message.into_packet(timestamp, stream_id)?;

        if self.tx.send(OutboundJob { packet, on_fail }).await.is_err() {
            self.report_fatal(PublishErrorKind::ThreadInterrupt, "Write queue closed")
                .await;
            return Err(Error::connection("Write queue closed"));
        }
        Ok(())
    }

    /// Register a transaction and enqueue the command
    async fn send_command(
        &self,
        make: impl FnOnce(f64) -> RtmpCommand,
        name: &str,
        stream_id: u32,
        on_fail: PublishErrorKind,
    ) -> Result<()> {
        let tid = {
            let mut session = self.session.write().await;
            session.register_command(name)
        };
        self.enqueue(RtmpMessage::Command(make(tid as f64)), 0, stream_id, on_fail)
            .await
    }

    /// Kick off the command sequence: the connect command itself
    pub async fn send_connect(&self, app: &str, tc_url: &str) -> Result<()> {
        self.send_command(
            |tid| RtmpCommand::connect(tid, app, tc_url),
            "connect",
            0,
            PublishErrorKind::ConnectCmdFail,
        )
        .await
    }

    /// On connect success: releaseStream, FCPublish, createStream in order
    async fn send_publish_preamble(&self) -> Result<()> {
        let name = self.stream_name.clone();

        self.send_command(
            |tid| RtmpCommand::release_stream(tid, &name),
            "releaseStream",
            0,
            PublishErrorKind::ReleaseCmdFail,
        )
        .await?;

        self.send_command(
            |tid| RtmpCommand::fc_publish(tid, &name),
            "FCPublish",
            0,
            PublishErrorKind::FcPublishCmdFail,
        )
        .await?;

        self.send_command(
            RtmpCommand::create_stream,
            "createStream",
            0,
            PublishErrorKind::CreateStreamCmdFail,
        )
        .await
    }

    /// On createStream's reply: publish on the returned stream id
    async fn send_publish(&self, stream_id: u32) -> Result<()> {
        let name = self.stream_name.clone();
        self.send_command(
            |tid| RtmpCommand::publish(tid, &name),
            "publish",
            stream_id,
            PublishErrorKind::PublishCmdFail,
        )
        .await
    }

    /// Route a server command through the connect/publish state machine
    async fn handle_command(&self, command: RtmpCommand) -> Result<()> {
        match command.name.as_str() {
            "_result" => {
                let tid = command.transaction_id as u32;
                let pending = {
                    let mut session = self.session.write().await;
                    session.take_command(tid)
                };

                match pending.as_deref() {
                    Some("connect") => {
                        let code = command.reply_code();
                        if code == Some(CODE_CONNECT_SUCCESS) {
                            debug!("connect accepted, starting publish sequence");
                            self.send_publish_preamble().await?;
                        } else {
                            self.report_fatal(
                                PublishErrorKind::ReceiveRtmpFail,
                                format!("connect rejected with code {:?}", code),
                            )
                            .await;
                        }
                    }
                    Some("createStream") => {
                        let stream_id = command
                            .args
                            .get(1)
                            .and_then(|v| v.as_number())
                            .ok_or_else(|| {
                                Error::protocol("createStream reply carries no stream id")
                            })? as u32;

                        {
                            let mut session = self.session.write().await;
                            session.stream_id = stream_id;
                        }
                        debug!("createStream returned stream id {}", stream_id);
                        self.send_publish(stream_id).await?;
                    }
                    Some(other) => {
                        // releaseStream/FCPublish/publish replies carry nothing we need
                        trace!("Ignoring _result for {}", other);
                    }
                    None => {
                        trace!("Ignoring _result for unknown transaction {}", tid);
                    }
                }
            }
            "onStatus" => {
                let code = command.reply_code();
                if code == Some(CODE_PUBLISH_START) {
                    {
                        let mut state = self.state.write().await;
                        *state = PublisherState::Ready;
                    }
                    if !self.init_notified.swap(true, Ordering::SeqCst) {
                        debug!("Publish started");
                        self.listener.on_init_complete().await;
                    }
                } else {
                    self.report_fatal(
                        PublishErrorKind::ReceiveRtmpFail,
                        format!("Unexpected status code {:?}", code),
                    )
                    .await;
                }
            }
            "_error" => {
                self.report_fatal(
                    PublishErrorKind::ReceiveRtmpFail,
                    format!("Server returned error for transaction {}", command.transaction_id),
                )
                .await;
            }
            other => {
                // onFCPublish, onBWDone and friends
                trace!("Ignoring server command {}", other);
            }
        }
        Ok(())
    }

    /// Handle one decoded message from the server
    async fn dispatch(&self, reader: &mut ChunkReader, message: RtmpMessage) -> Result<()> {
        match message {
            RtmpMessage::SetChunkSize(size) => {
                if size < MIN_CHUNK_SIZE {
                    return Err(Error::protocol(format!(
                        "Refusing chunk size {} below the protocol minimum",
                        size
                    )));
                }
                debug!("Server chunk size is now {}", size);
                reader.set_chunk_size(size as usize);
                let mut session = self.session.write().await;
                session.chunk_size = size;
            }
            RtmpMessage::Abort(chunk_stream_id) => {
                reader.abort(chunk_stream_id);
            }
            RtmpMessage::WindowAckSize(size) => {
                let mut session = self.session.write().await;
                session.window_ack_size = size;
            }
            RtmpMessage::Acknowledgement(sequence) => {
                trace!("Server acknowledged {} bytes", sequence);
            }
            RtmpMessage::SetPeerBandwidth(..) => {
                trace!("Ignoring SetPeerBandwidth");
            }
            RtmpMessage::UserControl(UserControlEvent::PingRequest(timestamp)) => {
                self.enqueue(
                    RtmpMessage::UserControl(UserControlEvent::pong_for(timestamp)),
                    0,
                    0,
                    PublishErrorKind::ReceiveRtmpFail,
                )
                .await?;
            }
            RtmpMessage::UserControl(event) => {
                trace!("Ignoring user control event {:?}", event);
            }
            RtmpMessage::Command(command) => {
                self.handle_command(command).await?;
            }
            other => {
                trace!("Ignoring server message type {}", other.message_type());
            }
        }
        Ok(())
    }
}

/// The reader task: block on the transport, reassemble packets and
/// dispatch them. Transport failure is fatal; a malformed packet is
/// dropped, but repeated failures escalate.
pub(crate) async fn run_decode_loop<R>(
    shared: Arc<ConnectionShared>,
    mut transport: R,
    max_decode_failures: u32,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = ChunkReader::new();
    let mut consecutive_failures = 0u32;

    loop {
        let packet = match reader.read_packet(&mut transport).await {
            Ok(packet) => packet,
            Err(err) if err.is_transport() => {
                shared
                    .report_fatal(
                        PublishErrorKind::ReceiveRtmpFail,
                        format!("Transport failed: {}", err),
                    )
                    .await;
                return;
            }
            Err(err) => {
                consecutive_failures += 1;
                warn!(
                    "Dropping malformed chunk data ({} consecutive): {}",
                    consecutive_failures, err
                );
                if consecutive_failures >= max_decode_failures {
                    shared
                        .report_fatal(
                            PublishErrorKind::ReceiveRtmpFail,
                            format!("{} consecutive decode failures", consecutive_failures),
                        )
                        .await;
                    return;
                }
                continue;
            }
        };

        let result = match RtmpMessage::decode(&packet) {
            Ok(message) => shared.dispatch(&mut reader, message).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => consecutive_failures = 0,
            Err(err) => {
                consecutive_failures += 1;
                warn!(
                    "Dropping malformed packet ({} consecutive): {}",
                    consecutive_failures, err
                );
                if consecutive_failures >= max_decode_failures {
                    shared
                        .report_fatal(
                            PublishErrorKind::ReceiveRtmpFail,
                            format!("{} consecutive decode failures", consecutive_failures),
                        )
                        .await;
                    return;
                }
            }
        }
    }
}
