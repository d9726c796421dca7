//! Sliding-window bookkeeping shared by the sender and receiver.
//!
//! Both sides keep a deque of at most [`WINDOW_SIZE`] entries ordered by
//! modular sequence number. The sender's entries carry the outgoing payload
//! and a monotonic last-send instant for the retransmission timer; the
//! receiver's carry the arrived payload and the wall-clock timing pair the
//! caller gets with each chunk.

use std::time::Instant;

/// Number of entries either window holds.
pub const WINDOW_SIZE: usize = 100;

/// Sequence numbers wrap modulo this.
pub const SEQ_MODULUS: u32 = 10_000;

// A window reaching half the sequence space would make modular distance
// ambiguous for in-flight packets.
const _: () = assert!((WINDOW_SIZE as u32) < SEQ_MODULUS / 2);

/// Modular successor of a sequence number.
pub fn seq_after(seq: u32) -> u32 {
    (seq + 1) % SEQ_MODULUS
}

/// Lifecycle of one window entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Created but not yet transmitted (sender) / not yet arrived (receiver).
    Waiting,
    /// Transmitted; the retransmission timer is running.
    Sent,
    /// Arrived with a valid checksum; held until the in-order prefix reaches it.
    Received,
    /// Acknowledged by the peer; eligible to slide out.
    Acked,
}

// ── SendSlot ─────────────────────────────────────────────────────

/// One sender-side window entry.
#[derive(Debug)]
pub struct SendSlot {
    pub seq: u32,
    pub payload: Vec<u8>,
    pub state: SlotState,
    /// When this entry was last written to the socket.
    pub sent_at: Option<Instant>,
}

impl SendSlot {
    pub fn new(seq: u32, payload: Vec<u8>) -> Self {
        Self {
            seq,
            payload,
            state: SlotState::Waiting,
            sent_at: None,
        }
    }

    /// Record a (re)transmission at `now`.
    pub fn mark_sent(&mut self, now: Instant) {
        self.state = SlotState::Sent;
        self.sent_at = Some(now);
    }
}

// ── RecvSlot ─────────────────────────────────────────────────────

/// One receiver-side window entry.
#[derive(Debug)]
pub struct RecvSlot {
    pub seq: u32,
    pub state: SlotState,
    pub payload: Vec<u8>,
    /// Peer wall-clock send time from the frame header.
    pub sent_at: f64,
    /// Local wall-clock arrival time.
    pub received_at: f64,
}

impl RecvSlot {
    /// A slot waiting for `seq` to arrive.
    pub fn pending(seq: u32) -> Self {
        Self {
            seq,
            state: SlotState::Waiting,
            payload: Vec::new(),
            sent_at: 0.0,
            received_at: 0.0,
        }
    }

    /// Record arrival of the frame this slot was waiting for.
    pub fn mark_received(&mut self, sent_at: f64, received_at: f64, payload: Vec<u8>) {
        self.payload = payload;
        self.sent_at = sent_at;
        self.received_at = received_at;
        self.state = SlotState::Received;
    }
}

// ── Tests ────────────────────────────────────────────────────────
