//! # rdt-core
//!
//! Reliable data transport over an unreliable datagram service: a
//! sliding-window, checksummed, timeout-driven file transfer protocol that
//! delivers a byte stream in order, without loss, duplication, or
//! corruption, over lossy UDP.
//!
//! This crate contains:
//! - **Codec**: fixed 8000-byte DATA frames and 12-byte ACK frames ([`packet`])
//! - **Checksum**: MD5 over the canonical textual pre-image ([`checksum`])
//! - **Window**: entry types and modular sequence arithmetic ([`window`])
//! - **Sender**: fixed window, per-packet retransmission timers, end-of-stream
//!   sentinel ([`sender`])
//! - **Receiver**: ordered delivery, duplicate re-ACK, five-fold sentinel
//!   acknowledgement ([`receiver`])
//! - **Error**: [`RdtError`] — typed, `thiserror`-based hierarchy ([`error`])
//!
//! Each endpoint is a single cooperative task; the only suspension point is
//! the timed datagram receive. The sender owns its input stream and socket,
//! the receiver owns its output stream and socket, and both sockets close on
//! every exit path.

pub mod checksum;
pub mod clock;
pub mod error;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod window;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use error::RdtError;
pub use packet::{
    ACK_PACKET_SIZE, AckFrame, DATA_HEADER_SIZE, DataFrame, FrameBody, MSS_VALUE,
    UDP_MAX_CHUNK_SIZE,
};
pub use receiver::{RECV_IDLE_TIMEOUT, ReceivedChunk, Receiver};
pub use sender::{Sender, TIMEOUT};
pub use window::{SEQ_MODULUS, SlotState, WINDOW_SIZE};
