//! Domain-specific error types for the RDT protocol.
//!
//! All fallible operations return `Result<T, RdtError>`. Invalid input
//! never panics; every failure is typed and recoverable.
//!
//! A checksum mismatch is deliberately *not* represented here: a corrupted
//! frame still carries a parseable sequence number the caller may want, so
//! the codec reports it in-band as [`crate::packet::FrameBody::Corrupted`].

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the RDT protocol.
#[derive(Debug, Error)]
pub enum RdtError {
    // ── Frame Errors ─────────────────────────────────────────────
    /// The datagram has the wrong total length or an unparseable header.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// The caller handed the sender a chunk longer than one frame carries.
    #[error("oversized payload: {size} bytes (max {max})")]
    OversizedPayload { size: usize, max: usize },

    // ── Channel Errors ───────────────────────────────────────────
    /// Nothing arrived within the receiver's idle timeout; the peer is
    /// presumed dead.
    #[error("channel stalled: no datagram for {0:?}")]
    StalledChannel(Duration),

    /// The OS-level socket layer reported an error.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}
