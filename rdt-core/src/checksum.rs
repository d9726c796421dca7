//! Corruption-detection checksum for DATA frames.
//!
//! The digest is MD5 over the concatenation of the *decimal text* of the
//! sequence number, the timestamp, and the payload length, followed by the
//! raw payload bytes. The textual pre-image is the wire contract inherited
//! from the existing peer, so both ends must render the timestamp with the
//! same float formatting; this crate uses Rust's default shortest
//! round-trip form on both sides.

use md5::{Digest, Md5};

/// Size of the digest carried in every DATA header.
pub const CHECKSUM_SIZE: usize = 16;

/// Compute the DATA checksum for the given header fields and payload.
pub fn data_checksum(seq: u32, sent_at: f64, payload: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Md5::new();
    hasher.update(seq.to_string().as_bytes());
    hasher.update(sent_at.to_string().as_bytes());
    hasher.update(payload.len().to_string().as_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}
