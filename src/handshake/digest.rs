use crate::utils::calculate_hmac_sha256;
use crate::{Error, Result};

/// First 30 bytes of the Flash Player key; used to sign C1
pub const GENUINE_FP_KEY: &[u8; 30] = b"Genuine Adobe Flash Player 001";

/// Full 36-byte Flash Media Server key; used to validate S1
pub const GENUINE_FMS_KEY: &[u8; 36] = b"Genuine Adobe Flash Media Server 001";

/// Length of the SHA-256 digest embedded in C1/S1
pub const DIGEST_LENGTH: usize = 32;

/// Digest slot offset within a 1536-byte block, derived from the four
/// bytes following the version field.
pub fn digest_offset(block: &[u8]) -> Result<usize> {
    if block.len() < 12 {
        return Err(Error::handshake("Handshake block too short for digest"));
    }

    let sum = block[8] as usize + block[9] as usize + block[10] as usize + block[11] as usize;
    Ok(sum % 728 + 12)
}

/// HMAC-SHA256 over the block with the digest slot excised
pub fn compute_digest(block: &[u8], offset: usize, key: &[u8]) -> [u8; 32] {
    let mut message = Vec::with_capacity(block.len() - DIGEST_LENGTH);
    message.extend_from_slice(&block[..offset]);
    message.extend_from_slice(&block[offset + DIGEST_LENGTH..]);
    calculate_hmac_sha256(key, &message)
}

/// Embed the client digest into a C1 block in place
pub fn embed_client_digest(block: &mut [u8]) -> Result<()> {
    let offset = digest_offset(block)?;
    let digest = compute_digest(block, offset, GENUINE_FP_KEY);
    block[offset..offset + DIGEST_LENGTH].copy_from_slice(&digest);
    Ok(())
}

/// Check the server digest in an S1 block. A mismatch is not an error;
/// it means the peer speaks the simple handshake.
pub fn verify_server_digest(block: &[u8]) -> bool {
    let offset = match digest_offset(block) {
        Ok(offset) if offset + DIGEST_LENGTH <= block.len() => offset,
        _ => return false,
    };

    let expected = compute_digest(block, offset, GENUINE_FMS_KEY);
    block[offset..offset + DIGEST_LENGTH] == expected
}
