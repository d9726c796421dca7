//! Sliding-window sender.
//!
//! The sender drains a lazy chunk stream through a fixed-size window of
//! DATA frames. Each outer iteration transmits the leftmost `Waiting`
//! entry, then blocks in the *wait phase* until nothing is left in flight:
//! ACKs mark entries `Acked`, a receive timeout retransmits every in-flight
//! entry whose per-packet timer has expired, and after every event the
//! window slides acknowledged entries off the left edge and refills from
//! the input. When the input runs dry the sender appends a single
//! empty-payload sentinel frame; the transfer is complete once that
//! sentinel has been acknowledged and the window is empty.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::time;
use tracing::{debug, trace};

use crate::error::RdtError;
use crate::packet::{ACK_PACKET_SIZE, AckFrame, DataFrame, UDP_MAX_CHUNK_SIZE};
use crate::window::{SendSlot, SlotState, WINDOW_SIZE, seq_after};

/// Per-packet retransmission timer.
pub const TIMEOUT: Duration = Duration::from_millis(8);

/// Receive buffer a little wider than an ACK so oversized datagrams are
/// recognised and discarded instead of silently truncated to ACK size.
const ACK_RECV_BUF: usize = 64;

/// Drives one file transfer toward a peer.
///
/// `chunks` is the caller's lazy input stream, typically a file read in
/// [`UDP_MAX_CHUNK_SIZE`] slices. Chunks must be non-empty: the empty
/// payload is reserved for the end-of-stream sentinel, which the sender
/// appends itself.
pub struct Sender<I> {
    local_port: u16,
    peer: SocketAddr,
    chunks: I,
    window: VecDeque<SendSlot>,
    next_seq: u32,
    sentinel_queued: bool,
    retransmissions: u64,
}

impl<I> Sender<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    /// Create a sender bound to `local_port` (0 for an ephemeral port)
    /// targeting `peer`.
    pub fn new(local_port: u16, peer: SocketAddr, chunks: I) -> Self {
        Self {
            local_port,
            peer,
            chunks,
            window: VecDeque::with_capacity(WINDOW_SIZE),
            next_seq: 0,
            sentinel_queued: false,
            retransmissions: 0,
        }
    }

    /// Run the transfer to completion and return the retransmission count.
    ///
    /// Retries forever on loss; a caller wanting a global deadline wraps
    /// this future in its own timeout. Socket errors are fatal.
    pub async fn run(mut self) -> Result<u64, RdtError> {
        // The first refill happens before the socket exists, so an
        // oversized chunk surfaces without any I/O.
        self.refill()?;

        let socket = UdpSocket::bind(("0.0.0.0", self.local_port)).await?;
        let local = socket.local_addr()?;
        debug!(peer = %self.peer, %local, "sender bound");

        while !self.window.is_empty() {
            if let Some(idx) = self
                .window
                .iter()
                .position(|slot| slot.state == SlotState::Waiting)
            {
                let slot = &mut self.window[idx];
                Self::transmit(&socket, self.peer, slot, &mut self.retransmissions).await?;
            }
            self.await_acks(&socket).await?;
        }

        debug!(retransmissions = self.retransmissions, "transfer complete");
        Ok(self.retransmissions)
    }

    /// Wait phase: block for ACKs until nothing is left in flight.
    async fn await_acks(&mut self, socket: &UdpSocket) -> Result<(), RdtError> {
        let mut buf = [0u8; ACK_RECV_BUF];
        while self
            .window
            .iter()
            .any(|slot| slot.state == SlotState::Sent)
        {
            match time::timeout(TIMEOUT, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, _))) if len == ACK_PACKET_SIZE => {
                    if let Ok(ack) = AckFrame::decode(&buf[..len]) {
                        self.acknowledge(ack.seq);
                    }
                }
                // Not an ACK; discard.
                Ok(Ok((len, _))) => trace!(len, "discarded non-ACK datagram"),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => self.retransmit_expired(socket).await?,
            }
            self.slide();
            self.refill()?;
        }
        Ok(())
    }

    /// Mark the window entry carrying `seq` as acknowledged.
    ///
    /// ACKs for sequence numbers no longer in the window (late duplicates
    /// from before a slide) are ignored.
    fn acknowledge(&mut self, seq: u32) {
        if let Some(slot) = self.window.iter_mut().find(|slot| slot.seq == seq) {
            trace!(seq, "acked");
            slot.state = SlotState::Acked;
        }
    }

    /// Retransmit every in-flight entry whose timer has expired.
    async fn retransmit_expired(&mut self, socket: &UdpSocket) -> Result<(), RdtError> {
        let now = Instant::now();
        let peer = self.peer;
        for slot in self.window.iter_mut() {
            let expired = slot.state == SlotState::Sent
                && slot
                    .sent_at
                    .is_some_and(|at| now.duration_since(at) > TIMEOUT);
            if expired {
                Self::transmit(socket, peer, slot, &mut self.retransmissions).await?;
            }
        }
        Ok(())
    }

    /// Encode and send one entry, updating its state and the counter.
    ///
    /// The counter moves only when the entry is already `Sent` at the
    /// moment of the call: the first transmission is free, every later one
    /// counts.
    async fn transmit(
        socket: &UdpSocket,
        peer: SocketAddr,
        slot: &mut SendSlot,
        retransmissions: &mut u64,
    ) -> Result<(), RdtError> {
        let frame = DataFrame::encode(slot.seq, &slot.payload)?;
        socket.send_to(&frame, peer).await?;
        if slot.state == SlotState::Sent {
            *retransmissions += 1;
            debug!(seq = slot.seq, total = *retransmissions, "retransmitted");
        }
        slot.mark_sent(Instant::now());
        Ok(())
    }

    /// Drop acknowledged entries off the left edge.
    fn slide(&mut self) {
        while self
            .window
            .front()
            .is_some_and(|slot| slot.state == SlotState::Acked)
        {
            self.window.pop_front();
        }
    }

    /// Top the window back up from the input stream.
    ///
    /// When the input runs dry, exactly one empty-payload sentinel entry is
    /// appended and the input is never polled again. Oversized chunks are
    /// rejected here, before any transmission is attempted.
    fn refill(&mut self) -> Result<(), RdtError> {
        while self.window.len() < WINDOW_SIZE && !self.sentinel_queued {
            let payload = match self.chunks.next() {
                Some(chunk) => chunk,
                None => {
                    self.sentinel_queued = true;
                    Vec::new()
                }
            };
            if payload.len() > UDP_MAX_CHUNK_SIZE {
                return Err(RdtError::OversizedPayload {
                    size: payload.len(),
                    max: UDP_MAX_CHUNK_SIZE,
                });
            }
            let seq = self.next_seq;
            self.next_seq = seq_after(seq);
            self.window.push_back(SendSlot::new(seq, payload));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter;

    fn localhost() -> SocketAddr {
        "127.0.0.1:9".parse().unwrap()
    }

    #[test]
    fn refill_appends_exactly_one_sentinel() {
        let chunks = vec![b"a".to_vec(), b"b".to_vec()];
        let mut sender = Sender::new(0, localhost(), chunks.into_iter());

        sender.refill().unwrap();
        assert_eq!(sender.window.len(), 3);
        assert_eq!(sender.window[0].payload, b"a");
        assert_eq!(sender.window[1].payload, b"b");
        assert!(sender.window[2].payload.is_empty());
        assert!(sender.sentinel_queued);

        // Further refills never touch the exhausted input again.
        sender.refill().unwrap();
        assert_eq!(sender.window.len(), 3);
    }

    #[test]
    fn refill_caps_at_window_size() {
        let chunks = iter::repeat_n(b"chunk".to_vec(), WINDOW_SIZE * 2);
        let mut sender = Sender::new(0, localhost(), chunks);

        sender.refill().unwrap();
        assert_eq!(sender.window.len(), WINDOW_SIZE);
        assert!(!sender.sentinel_queued);
        for (i, slot) in sender.window.iter().enumerate() {
            assert_eq!(slot.seq, i as u32);
            assert_eq!(slot.state, SlotState::Waiting);
        }
    }

    #[test]
    fn refill_assigns_modular_sequence_numbers() {
        let mut sender = Sender::new(0, localhost(), iter::repeat(b"c".to_vec()));
        sender.next_seq = crate::window::SEQ_MODULUS - 2;

        sender.refill().unwrap();
        assert_eq!(sender.window[0].seq, crate::window::SEQ_MODULUS - 2);
        assert_eq!(sender.window[1].seq, crate::window::SEQ_MODULUS - 1);
        assert_eq!(sender.window[2].seq, 0);
        assert_eq!(sender.window[3].seq, 1);
    }

    #[test]
    fn oversized_chunk_rejected_at_refill() {
        let chunks = vec![vec![0u8; UDP_MAX_CHUNK_SIZE + 1]];
        let mut sender = Sender::new(0, localhost(), chunks.into_iter());

        let err = sender.refill().unwrap_err();
        assert!(matches!(err, RdtError::OversizedPayload { .. }));
    }

    #[test]
    fn slide_stops_at_first_unacked_entry() {
        let mut sender = Sender::new(0, localhost(), iter::empty());
        sender.refill().unwrap(); // sentinel only
        sender.window.clear();
        for (seq, state) in [
            (0, SlotState::Acked),
            (1, SlotState::Acked),
            (2, SlotState::Sent),
            (3, SlotState::Waiting),
        ] {
            let mut slot = SendSlot::new(seq, vec![seq as u8]);
            slot.state = state;
            sender.window.push_back(slot);
        }

        sender.slide();
        assert_eq!(sender.window.len(), 2);
        assert_eq!(sender.window[0].seq, 2);
    }

    #[test]
    fn stale_acks_outside_window_are_ignored() {
        let mut sender = Sender::new(0, localhost(), vec![b"x".to_vec()].into_iter());
        sender.refill().unwrap();

        sender.acknowledge(9_500); // nowhere in the window
        assert!(sender.window.iter().all(|s| s.state == SlotState::Waiting));

        sender.acknowledge(0);
        assert_eq!(sender.window[0].state, SlotState::Acked);
    }

    #[tokio::test]
    async fn retransmission_counter_moves_on_resend_only() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer = sink.local_addr().unwrap();

        let mut slot = SendSlot::new(0, b"payload".to_vec());
        let mut count = 0u64;

        Sender::<iter::Empty<Vec<u8>>>::transmit(&socket, peer, &mut slot, &mut count)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(slot.state, SlotState::Sent);

        Sender::<iter::Empty<Vec<u8>>>::transmit(&socket, peer, &mut slot, &mut count)
            .await
            .unwrap();
        assert_eq!(count, 1);

        Sender::<iter::Empty<Vec<u8>>>::transmit(&socket, peer, &mut slot, &mut count)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
