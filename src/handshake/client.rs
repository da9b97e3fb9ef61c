use crate::handshake::{embed_client_digest, verify_server_digest, HANDSHAKE_SIZE, RTMP_VERSION};
use crate::utils::{current_timestamp, generate_random_bytes};
use crate::{Error, Result};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Client version bytes carried in the C1 zero field; a nonzero value
/// signals the digest handshake to the server.
const CLIENT_VERSION: [u8; 4] = [0x0C, 0x00, 0x0D, 0x0E];

/// Build the C1 block: u32 time, 4-byte client version, random fill with
/// the client digest embedded.
fn build_c1() -> Result<Vec<u8>> {
    let mut block = Vec::with_capacity(HANDSHAKE_SIZE);
    block.extend_from_slice(&current_timestamp().to_be_bytes());
    block.extend_from_slice(&CLIENT_VERSION);
    block.extend_from_slice(&generate_random_bytes(HANDSHAKE_SIZE - 8));

    embed_client_digest(&mut block)?;
    Ok(block)
}

/// Run the full client handshake over a split connection: write C0+C1,
/// read S0+S1, write C2 (echo of S1), read S2. Any short read or version
/// mismatch fails the connection.
pub async fn perform_client_handshake<R, W>(reader: &mut R, writer: &mut W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // C0 + C1 go out together, before any read
    let c1 = build_c1()?;
    writer
        .write_all(&[RTMP_VERSION])
        .await
        .map_err(|e| Error::handshake(format!("Failed to write C0: {}", e)))?;
    writer
        .write_all(&c1)
        .await
        .map_err(|e| Error::handshake(format!("Failed to write C1: {}", e)))?;
    writer
        .flush()
        .await
        .map_err(|e| Error::handshake(format!("Failed to flush C0+C1: {}", e)))?;

    // S0: version byte
    let s0 = reader
        .read_u8()
        .await
        .map_err(|e| Error::handshake(format!("Failed to read S0: {}", e)))?;
    if s0 != RTMP_VERSION {
        return Err(Error::handshake(format!(
            "Unsupported RTMP version from server: {}, expected {}",
            s0, RTMP_VERSION
        )));
    }

    // S1
    let mut s1 = vec![0u8; HANDSHAKE_SIZE];
    reader
        .read_exact(&mut s1)
        .await
        .map_err(|e| Error::handshake(format!("Failed to read S1: {}", e)))?;

    if verify_server_digest(&s1) {
        debug!("Server handshake digest verified");
    } else {
        // Plain servers echo random bytes; proceed with the simple variant
        warn!("Server digest not present or invalid, using simple handshake");
    }

    // C2: echo of S1
    writer
        .write_all(&s1)
        .await
        .map_err(|e| Error::handshake(format!("Failed to write C2: {}", e)))?;
    writer
        .flush()
        .await
        .map_err(|e| Error::handshake(format!("Failed to flush C2: {}", e)))?;

    // S2: read and discard
    let mut s2 = vec![0u8; HANDSHAKE_SIZE];
    reader
        .read_exact(&mut s2)
        .await
        .map_err(|e| Error::handshake(format!("Failed to read S2: {}", e)))?;

    debug!("Client handshake complete");
    Ok(())
}
