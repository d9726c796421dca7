//! Ordered-delivery receiver.
//!
//! The receiver buffers out-of-order DATA frames in a fixed-size window
//! and hands the caller the in-order prefix, one chunk at a time. Every
//! frame with a valid checksum is acknowledged (including duplicates,
//! whose first ACK may have been lost), while malformed or corrupted
//! frames are dropped without an ACK so the sender's timer retransmits
//! them. A zero-length payload is the end-of-stream sentinel: it is
//! acknowledged five times (the closing handshake must survive ACK loss)
//! and drains the window.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time;
use tracing::{debug, trace};

use crate::clock::unix_now;
use crate::error::RdtError;
use crate::packet::{AckFrame, DataFrame, FrameBody, MSS_VALUE};
use crate::window::{RecvSlot, SlotState, WINDOW_SIZE, seq_after};

/// The receiver gives up when nothing arrives for this long.
pub const RECV_IDLE_TIMEOUT: Duration = Duration::from_secs(20);

/// How many times the end-of-stream sentinel is acknowledged.
const SENTINEL_ACK_REPEAT: usize = 5;

/// One in-order payload chunk handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedChunk {
    pub seq: u32,
    /// Peer wall-clock time the frame was encoded (from the header).
    pub sent_at: f64,
    /// Local wall-clock time the frame arrived.
    pub received_at: f64,
    pub payload: Vec<u8>,
}

/// Receives one transfer on a bound UDP socket.
pub struct Receiver {
    socket: UdpSocket,
    window: VecDeque<RecvSlot>,
    ready: VecDeque<ReceivedChunk>,
    buf: Vec<u8>,
    idle_timeout: Duration,
    has_finished: bool,
}

impl Receiver {
    /// Bind to `host:port` and prime the window with sequence numbers
    /// `0..WINDOW_SIZE`.
    pub async fn bind(host: &str, port: u16) -> Result<Self, RdtError> {
        let socket = UdpSocket::bind((host, port)).await?;
        let local = socket.local_addr()?;
        debug!(%local, "receiver bound");
        Ok(Self {
            socket,
            window: (0..WINDOW_SIZE as u32).map(RecvSlot::pending).collect(),
            ready: VecDeque::new(),
            buf: vec![0u8; MSS_VALUE],
            idle_timeout: RECV_IDLE_TIMEOUT,
            has_finished: false,
        })
    }

    /// Override the idle timeout (the default is [`RECV_IDLE_TIMEOUT`]).
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// The locally bound address (useful after binding to port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, RdtError> {
        Ok(self.socket.local_addr()?)
    }

    /// Next in-order chunk, or `Ok(None)` once the stream has ended.
    ///
    /// Blocks until enough datagrams have arrived to extend the in-order
    /// prefix. Fails with [`RdtError::StalledChannel`] if nothing arrives
    /// within the idle timeout.
    pub async fn next_chunk(&mut self) -> Result<Option<ReceivedChunk>, RdtError> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Ok(Some(chunk));
            }
            if self.window.is_empty() {
                return Ok(None);
            }

            let (len, from) =
                match time::timeout(self.idle_timeout, self.socket.recv_from(&mut self.buf)).await
                {
                    Ok(Ok(received)) => received,
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => return Err(RdtError::StalledChannel(self.idle_timeout)),
                };

            if len != MSS_VALUE {
                trace!(len, "dropped undersized datagram");
                continue;
            }
            let frame = match DataFrame::decode(&self.buf[..len]) {
                Ok(frame) => frame,
                Err(_) => {
                    trace!("dropped malformed frame");
                    continue;
                }
            };

            match frame.body {
                // No ACK for a damaged frame: the sender's timer resends it.
                FrameBody::Corrupted => {
                    debug!(seq = frame.seq, "dropped corrupted frame");
                }
                FrameBody::Valid(payload) if payload.is_empty() => {
                    self.finish(frame.seq, from).await?;
                }
                FrameBody::Valid(payload) => {
                    self.accept(frame.seq, frame.sent_at, payload, from).await?;
                }
            }
        }
    }

    /// Regular DATA: acknowledge, record, extend the in-order prefix.
    ///
    /// Frames whose sequence number is not `Waiting` (duplicates, or
    /// outside the window) are still acknowledged, because the sender may be
    /// retransmitting precisely since the first ACK was lost. They are never
    /// re-delivered.
    async fn accept(
        &mut self,
        seq: u32,
        sent_at: f64,
        payload: Vec<u8>,
        from: SocketAddr,
    ) -> Result<(), RdtError> {
        self.socket.send_to(&AckFrame::encode(seq), from).await?;

        if let Some(slot) = self
            .window
            .iter_mut()
            .find(|slot| slot.seq == seq && slot.state == SlotState::Waiting)
        {
            slot.mark_received(sent_at, unix_now(), payload);
        } else {
            trace!(seq, "re-acked duplicate");
        }

        self.deliver_prefix();
        Ok(())
    }

    /// End-of-stream sentinel: acknowledge five times, then drain the window.
    ///
    /// The redundant ACKs protect the closing handshake: the sender needs
    /// only one of them to slide its window empty and exit.
    async fn finish(&mut self, seq: u32, from: SocketAddr) -> Result<(), RdtError> {
        for _ in 0..SENTINEL_ACK_REPEAT {
            self.socket.send_to(&AckFrame::encode(seq), from).await?;
        }

        while self.window.back().is_some_and(|slot| slot.seq != seq) {
            self.window.pop_back();
        }
        self.window.pop_back();
        self.has_finished = true;
        debug!(seq, "end of stream");
        Ok(())
    }

    /// Move the in-order `Received` prefix into the ready queue, topping
    /// the window back up while the stream is still open.
    fn deliver_prefix(&mut self) {
        while self
            .window
            .front()
            .is_some_and(|slot| slot.state == SlotState::Received)
        {
            let next_seq = self.window.back().map(|slot| seq_after(slot.seq));
            if let Some(slot) = self.window.pop_front() {
                self.ready.push_back(ReceivedChunk {
                    seq: slot.seq,
                    sent_at: slot.sent_at,
                    received_at: slot.received_at,
                    payload: slot.payload,
                });
            }
            if !self.has_finished {
                if let Some(seq) = next_seq {
                    self.window.push_back(RecvSlot::pending(seq));
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
