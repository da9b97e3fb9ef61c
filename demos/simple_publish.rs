// Simple publishing example
//
// Connects to an RTMP server, waits for the publish handshake and streams
// a few synthetic frames.
//
// Usage:
//   cargo run --example simple_publish -- rtmp://localhost/live mystream

use async_trait::async_trait;
use log::{error, info};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use vrtmp::{
    MediaKind, MetadataParams, PublishErrorKind, PublisherListener, Result, RtmpPublisher,
};

struct LoggingListener {
    ready: Notify,
}

#[async_trait]
impl PublisherListener for LoggingListener {
    async fn on_init_complete(&self) {
        info!("Publish accepted, streaming");
        self.ready.notify_one();
    }

    async fn on_error(&self, kind: PublishErrorKind, detail: String) {
        error!("Publisher failed with {}: {}", kind, detail);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let url = args.get(1).map(String::as_str).unwrap_or("rtmp://localhost/live");
    let stream = args.get(2).map(String::as_str).unwrap_or("demo");

    let listener = Arc::new(LoggingListener { ready: Notify::new() });
    let mut publisher = RtmpPublisher::new();

    info!("Publishing {} to {}", stream, url);
    publisher.init(url, listener.clone(), stream).await?;
    listener.ready.notified().await;

    let params = MetadataParams {
        width: 1280,
        height: 720,
        frame_rate: 30,
        sample_rate: 44100,
        channel_count: 2,
        // Placeholder parameter sets; a real encoder supplies these
        sps: vec![0x67, 0x42, 0x00, 0x1E, 0x8D, 0x68, 0x05, 0x00],
        pps: vec![0x68, 0xCE, 0x3C, 0x80],
        ..Default::default()
    };
    publisher.setup_metadata(&params).await?;

    for i in 0..300u32 {
        let kind = if i % 30 == 0 {
            MediaKind::H264Key
        } else {
            MediaKind::H264Inter
        };
        let frame = vec![0u8; 256];
        publisher.send_data(kind, &frame, i * 33).await?;
        tokio::time::sleep(Duration::from_millis(33)).await;
    }

    publisher.release().await;
    info!("Done");
    Ok(())
}
