use crate::handshake::perform_client_handshake;
use crate::media::{
    aac_sequence_header, avc_sequence_header, metadata_properties, wrap_frame, MediaKind,
    MetadataParams,
};
use crate::protocol::{RtmpData, RtmpMessage, FLV_TAG_AUDIO, FLV_TAG_META, FLV_TAG_VIDEO};
use crate::publisher::{
    run_decode_loop, run_writer_task, ConnectionShared, PublishErrorKind, PublisherConfig,
    PublisherListener, PublisherState,
};
use crate::session::RtmpSession;
use crate::{Error, Result};
use log::{debug, info};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use url::Url;

/// Client-side RTMP publishing engine: connects, handshakes, runs the
/// connect/publish command sequence and streams media frames.
pub struct RtmpPublisher {
    config: PublisherConfig,
    state: Arc<RwLock<PublisherState>>,
    session: Arc<RwLock<RtmpSession>>,
    conn: Option<ConnectionHandle>,
}

struct ConnectionHandle {
    shared: Arc<ConnectionShared>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

/// Host, port and application name extracted from a target URL
#[derive(Debug, Clone, PartialEq, Eq)]
struct PublishTarget {
    host: String,
    port: u16,
    app: String,
}

fn parse_target(url: &str) -> Result<PublishTarget> {
    let parsed = Url::parse(url).map_err(|e| Error::config(format!("Invalid URL: {}", e)))?;

    if parsed.scheme() != "rtmp" {
        return Err(Error::config(format!(
            "Unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::config("Missing host in URL"))?
        .to_string();
    let port = parsed.port().unwrap_or(1935);

    let app = parsed
        .path()
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| Error::config("Missing app name in URL"))?
        .to_string();

    Ok(PublishTarget { host, port, app })
}

impl RtmpPublisher {
    pub fn new() -> Self {
        RtmpPublisher::with_config(PublisherConfig::default())
    }

    pub fn with_config(config: PublisherConfig) -> Self {
        RtmpPublisher {
            config,
            state: Arc::new(RwLock::new(PublisherState::New)),
            session: Arc::new(RwLock::new(RtmpSession::new())),
            conn: None,
        }
    }

    /// Current lifecycle state
    pub async fn state(&self) -> PublisherState {
        *self.state.read().await
    }

    /// Connect, handshake and start the publish sequence. The listener's
    /// on_init_complete fires once the server accepts the publish.
    pub async fn init(
        &mut self,
        url: &str,
        listener: Arc<dyn PublisherListener>,
        stream_name: &str,
    ) -> Result<()> {
        {
            let state = self.state.read().await;
            if !state.accepts_init() {
                let detail = format!("init called in state {:?}", *state);
                listener
                    .on_error(PublishErrorKind::IllegalState, detail.clone())
                    .await;
                return Err(Error::invalid_state(detail));
            }
        }

        {
            let mut state = self.state.write().await;
            *state = PublisherState::Repairing;
        }
        {
            let mut session = self.session.write().await;
            *session = RtmpSession::new();
        }

        let target = match parse_target(url) {
            Ok(target) => target,
            Err(err) => {
                return self
                    .fail_init(&listener, PublishErrorKind::UrlIncorrect, err)
                    .await;
            }
        };
        info!(
            "Connecting to {}:{} app {} stream {}",
            target.host, target.port, target.app, stream_name
        );

        let addr = format!("{}:{}", target.host, target.port);
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(&addr),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                let err = Error::connection(format!("Failed to connect to {}: {}", addr, err));
                return self
                    .fail_init(&listener, PublishErrorKind::ConnectServerFail, err)
                    .await;
            }
            Err(_) => {
                let err = Error::timeout(format!("Connect to {} timed out", addr));
                return self
                    .fail_init(&listener, PublishErrorKind::ConnectServerFail, err)
                    .await;
            }
        };
        let _ = stream.set_nodelay(true);

        let (mut read_half, mut write_half) = stream.into_split();
        if let Err(err) = perform_client_handshake(&mut read_half, &mut write_half).await {
            return self
                .fail_init(&listener, PublishErrorKind::HandshakeFail, err)
                .await;
        }

        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let shared = Arc::new(ConnectionShared::new(
            self.state.clone(),
            self.session.clone(),
            listener,
            tx,
            stream_name.to_string(),
        ));

        let writer_task = tokio::spawn(run_writer_task(
            rx,
            write_half,
            shared.clone(),
            self.config.chunk_size,
        ));

        // Announce our chunk size before anything else goes out
        shared
            .enqueue(
                RtmpMessage::SetChunkSize(self.config.chunk_size),
                0,
                0,
                PublishErrorKind::SetChunkSizeFail,
            )
            .await?;
        shared.send_connect(&target.app, url).await?;

        let reader_task = tokio::spawn(run_decode_loop(
            shared.clone(),
            read_half,
            self.config.max_decode_failures,
        ));

        self.conn = Some(ConnectionHandle {
            shared,
            reader_task,
            writer_task,
        });
        Ok(())
    }

    async fn fail_init(
        &self,
        listener: &Arc<dyn PublisherListener>,
        kind: PublishErrorKind,
        err: Error,
    ) -> Result<()> {
        {
            let mut state = self.state.write().await;
            *state = PublisherState::Fail;
        }
        listener.on_error(kind, err.to_string()).await;
        Err(err)
    }

    /// Tear down the connection and return to New. Close errors are
    /// swallowed; aborting the tasks drops both transport halves.
    pub async fn release(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.reader_task.abort();
            conn.writer_task.abort();
            debug!("Connection released");
        }

        {
            let mut session = self.session.write().await;
            *session = RtmpSession::new();
        }
        let mut state = self.state.write().await;
        *state = PublisherState::New;
    }

    /// Send the onMetaData notification plus the AAC and AVC sequence
    /// headers. Call once publishing is Ready, before the first frame.
    pub async fn setup_metadata(&self, params: &MetadataParams) -> Result<()> {
        let shared = self.shared()?;
        let stream_id = self.session.read().await.stream_id;

        let data = RtmpData::set_data_frame(metadata_properties(params));
        shared
            .enqueue(
                RtmpMessage::Data(data),
                0,
                stream_id,
                PublishErrorKind::SendMetaDataFail,
            )
            .await?;

        shared
            .enqueue(
                RtmpMessage::Audio(aac_sequence_header()),
                0,
                stream_id,
                PublishErrorKind::SendAudioHeaderFail,
            )
            .await?;

        let video_header = match avc_sequence_header(&params.sps, &params.pps) {
            Ok(bytes) => bytes,
            Err(err) => {
                shared
                    .report_fatal(PublishErrorKind::SendVideoHeaderFail, err.to_string())
                    .await;
                return Err(err);
            }
        };
        shared
            .enqueue(
                RtmpMessage::Video(video_header),
                0,
                stream_id,
                PublishErrorKind::SendVideoHeaderFail,
            )
            .await
    }

    /// Send one coded frame. Timestamps are rebased so the stream starts
    /// at zero.
    pub async fn send_data(&self, kind: MediaKind, data: &[u8], timestamp_ms: u32) -> Result<()> {
        let shared = self.shared()?;
        let (timestamp, stream_id) = {
            let mut session = self.session.write().await;
            let timestamp = session.timestamp_origin.normalize(timestamp_ms);
            (timestamp, session.stream_id)
        };

        let tag = wrap_frame(kind, data);
        let message = if kind.is_video() {
            RtmpMessage::Video(tag)
        } else {
            RtmpMessage::Audio(tag)
        };

        shared
            .enqueue(message, timestamp, stream_id, PublishErrorKind::SendDataFail)
            .await
    }

    /// Pass a pre-built FLV tag body through unchanged
    pub async fn send_flv_tag(&self, tag_type: u8, data: &[u8], timestamp_ms: u32) -> Result<()> {
        let shared = self.shared()?;

        let message = match tag_type {
            FLV_TAG_AUDIO => RtmpMessage::Audio(data.to_vec()),
            FLV_TAG_VIDEO => RtmpMessage::Video(data.to_vec()),
            FLV_TAG_META => RtmpMessage::Metadata(data.to_vec()),
            other => {
                return Err(Error::protocol(format!("Unsupported FLV tag type {:#04x}", other)))
            }
        };

        let (timestamp, stream_id) = {
            let mut session = self.session.write().await;
            let timestamp = session.timestamp_origin.normalize(timestamp_ms);
            (timestamp, session.stream_id)
        };

        shared
            .enqueue(message, timestamp, stream_id, PublishErrorKind::SendDataFail)
            .await
    }

    fn shared(&self) -> Result<&Arc<ConnectionShared>> {
        self.conn
            .as_ref()
            .map(|conn| &conn.shared)
            .ok_or_else(|| Error::invalid_state("Publisher is not connected"))
    }
}

impl Default for RtmpPublisher {
    fn default() -> Self {
        RtmpPublisher::new()
    }
}

impl Drop for RtmpPublisher {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.reader_task.abort();
            conn.writer_task.abort();
        }
    }
}
