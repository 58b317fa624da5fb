//! Content digests for local change detection
//!
//! A digest is the first 128 bits of SHA-256, hex encoded. Callers are
//! expected to canonicalize content before hashing so that formatting
//! differences never register as edits.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept.
const DIGEST_BYTES: usize = 16;

/// Compute the 128-bit content digest of `content`.
pub fn compute_content_checksum(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest[..DIGEST_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
