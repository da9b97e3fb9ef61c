use crate::chunk::ChunkWriter;
use crate::protocol::RtmpPacket;
use crate::publisher::{ConnectionShared, PublishErrorKind};
use log::{debug, trace};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

/// One outbound packet plus the error kind to report if its write fails
pub(crate) struct OutboundJob {
    pub packet: RtmpPacket,
    pub on_fail: PublishErrorKind,
}

/// Single consumer of the write queue. Owning the transport's write half
/// here guarantees FIFO order and keeps chunk framing from interleaving.
pub(crate) async fn run_writer_task<W>(
    mut rx: mpsc::Receiver<OutboundJob>,
    mut transport: W,
    shared: Arc<ConnectionShared>,
    chunk_size: u32,
) where
    W: AsyncWrite + Unpin,
{
    let mut writer = ChunkWriter::new();
    writer.set_chunk_size(chunk_size as usize);

    while let Some(job) = rx.recv().await {
        trace!(
            "Writing packet type {} on stream {} ({} bytes)",
            job.packet.message_type(),
            job.packet.message_stream_id(),
            job.packet.payload.len()
        );

        if let Err(err) = writer.write_packet(&job.packet, &mut transport).await {
            shared
                .report_fatal(job.on_fail, format!("Write failed: {}", err))
                .await;
            return;
        }
    }

    debug!("Write queue closed, writer task exiting");
}
