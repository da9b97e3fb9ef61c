// Shared utilities for integration tests: a scripted RTMP server and a
// recording listener.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use vrtmp::{
    Amf0Properties, Amf0Value, ChunkReader, ChunkWriter, PublishErrorKind, PublisherListener,
    RtmpCommand, RtmpMessage, CODE_CONNECT_SUCCESS, CODE_PUBLISH_START, HANDSHAKE_SIZE,
    RTMP_VERSION,
};

/// Initialize test logging; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything the scripted server observed before the session ended
#[derive(Debug, Default)]
pub struct ServerLog {
    /// Command names in arrival order
    pub commands: Vec<String>,
    /// Message stream id the publish command arrived on
    pub publish_stream_id: Option<u32>,
    /// Media and data messages: (message type, timestamp, payload)
    pub media: Vec<(u8, u32, Vec<u8>)>,
}

/// Listener that records callbacks and wakes waiting tests
#[derive(Default)]
pub struct RecordingListener {
    init_count: AtomicU32,
    errors: Mutex<Vec<(PublishErrorKind, String)>>,
    pub ready: Notify,
    pub failed: Notify,
}

impl RecordingListener {
    pub fn new() -> Self {
        RecordingListener::default()
    }

    pub fn init_count(&self) -> u32 {
        self.init_count.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<(PublishErrorKind, String)> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublisherListener for RecordingListener {
    async fn on_init_complete(&self) {
        self.init_count.fetch_add(1, Ordering::SeqCst);
        self.ready.notify_waiters();
        self.ready.notify_one();
    }

    async fn on_error(&self, kind: PublishErrorKind, detail: String) {
        self.errors.lock().unwrap().push((kind, detail));
        self.failed.notify_waiters();
        self.failed.notify_one();
    }
}

/// Server-side handshake: read C0+C1, answer S0+S1+S2, read C2
async fn server_handshake(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut c0 = [0u8; 1];
    socket.read_exact(&mut c0).await?;
    assert_eq!(c0[0], RTMP_VERSION, "client sent wrong version");

    let mut c1 = vec![0u8; HANDSHAKE_SIZE];
    socket.read_exact(&mut c1).await?;

    let s1: Vec<u8> = (0..HANDSHAKE_SIZE).map(|i| (i % 251) as u8).collect();
    socket.write_all(&[RTMP_VERSION]).await?;
    socket.write_all(&s1).await?;
    socket.write_all(&c1).await?;
    socket.flush().await?;

    let mut c2 = vec![0u8; HANDSHAKE_SIZE];
    socket.read_exact(&mut c2).await?;
    Ok(())
}

fn result_reply(tid: f64, args: Vec<Amf0Value>) -> RtmpCommand {
    let mut reply = RtmpCommand::new("_result", tid);
    reply.args = args;
    reply
}

fn status_reply(code: &str) -> RtmpCommand {
    let mut info = Amf0Properties::new();
    info.set("level", Amf0Value::string("status"));
    info.set("code", Amf0Value::string(code));
    info.set("description", Amf0Value::string("scripted reply"));

    let mut reply = RtmpCommand::new("onStatus", 0.0);
    reply.args.push(Amf0Value::Null);
    reply.args.push(info.into_object());
    reply
}

/// Bind a scripted server that walks one client through the full publish
/// sequence, assigning `stream_id` from createStream, then records
/// `expected_media` media/data messages and returns its log.
pub async fn spawn_publish_server(
    stream_id: u32,
    expected_media: usize,
) -> (String, JoinHandle<ServerLog>) {
    spawn_publish_server_with_acks(stream_id, expected_media, 0).await
}

/// Same scripted server, but after accepting the publish it also sends
/// `acks_after_publish` Acknowledgement messages before reading media.
pub async fn spawn_publish_server_with_acks(
    stream_id: u32,
    expected_media: usize,
    acks_after_publish: u32,
) -> (String, JoinHandle<ServerLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("rtmp://127.0.0.1:{}/live", addr.port());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        server_handshake(&mut socket).await.unwrap();

        let mut log = ServerLog::default();
        let mut reader = ChunkReader::new();
        let mut writer = ChunkWriter::new();
        let (mut read_half, mut write_half) = socket.into_split();

        loop {
            let packet = match reader.read_packet(&mut read_half).await {
                Ok(packet) => packet,
                Err(_) => break,
            };

            match RtmpMessage::decode(&packet) {
                Ok(RtmpMessage::SetChunkSize(size)) => {
                    reader.set_chunk_size(size as usize);
                }
                Ok(RtmpMessage::Command(command)) => {
                    log.commands.push(command.name.clone());

                    let reply = match command.name.as_str() {
                        "connect" => {
                            let mut info = Amf0Properties::new();
                            info.set("level", Amf0Value::string("status"));
                            info.set("code", Amf0Value::string(CODE_CONNECT_SUCCESS));
                            Some(result_reply(
                                command.transaction_id,
                                vec![Amf0Value::Null, info.into_object()],
                            ))
                        }
                        "createStream" => Some(result_reply(
                            command.transaction_id,
                            vec![Amf0Value::Null, Amf0Value::Number(stream_id as f64)],
                        )),
                        "publish" => {
                            log.publish_stream_id = Some(packet.message_stream_id());
                            Some(status_reply(CODE_PUBLISH_START))
                        }
                        _ => None,
                    };

                    if let Some(reply) = reply {
                        let out = RtmpMessage::Command(reply)
                            .into_packet(0, packet.message_stream_id())
                            .unwrap();
                        writer.write_packet(&out, &mut write_half).await.unwrap();
                    }

                    if command.name == "publish" {
                        for i in 0..acks_after_publish {
                            let ack = RtmpMessage::Acknowledgement((i + 1) * 4096)
                                .into_packet(0, 0)
                                .unwrap();
                            writer.write_packet(&ack, &mut write_half).await.unwrap();
                        }
                    }
                }
                Ok(RtmpMessage::Audio(_))
                | Ok(RtmpMessage::Video(_))
                | Ok(RtmpMessage::Data(_))
                | Ok(RtmpMessage::Metadata(_)) => {
                    log.media.push((
                        packet.message_type(),
                        packet.timestamp(),
                        packet.payload.clone(),
                    ));
                    if log.media.len() >= expected_media {
                        break;
                    }
                }
                _ => {}
            }
        }

        // Hold the connection open until the client hangs up so the
        // publisher never observes a premature EOF while the test is
        // still asserting on its state.
        tokio::spawn(async move {
            let mut sink = [0u8; 1024];
            while matches!(read_half.read(&mut sink).await, Ok(n) if n > 0) {}
            drop(write_half);
        });

        log
    });

    (url, handle)
}

/// Server that answers the handshake with a wrong version byte
pub async fn spawn_bad_version_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("rtmp://127.0.0.1:{}/live", addr.port());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut c0c1 = vec![0u8; 1 + HANDSHAKE_SIZE];
        socket.read_exact(&mut c0c1).await.unwrap();
        socket.write_all(&[0x06]).await.unwrap();
        socket.flush().await.unwrap();
    });

    (url, handle)
}

/// Server that drops the connection before sending any handshake byte
pub async fn spawn_closing_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("rtmp://127.0.0.1:{}/live", addr.port());

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    (url, handle)
}

/// Server that completes the handshake but rejects the connect command
pub async fn spawn_rejecting_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("rtmp://127.0.0.1:{}/live", addr.port());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        server_handshake(&mut socket).await.unwrap();

        let mut reader = ChunkReader::new();
        let mut writer = ChunkWriter::new();
        let (mut read_half, mut write_half) = socket.split();

        loop {
            let packet = match reader.read_packet(&mut read_half).await {
                Ok(packet) => packet,
                Err(_) => return,
            };

            match RtmpMessage::decode(&packet) {
                Ok(RtmpMessage::SetChunkSize(size)) => reader.set_chunk_size(size as usize),
                Ok(RtmpMessage::Command(command)) if command.name == "connect" => {
                    let mut info = Amf0Properties::new();
                    info.set("level", Amf0Value::string("error"));
                    info.set("code", Amf0Value::string("NetConnection.Connect.Rejected"));
                    let reply = result_reply(
                        command.transaction_id,
                        vec![Amf0Value::Null, info.into_object()],
                    );
                    let out = RtmpMessage::Command(reply).into_packet(0, 0).unwrap();
                    writer.write_packet(&out, &mut write_half).await.unwrap();
                    return;
                }
                _ => {}
            }
        }
    });

    (url, handle)
}
