//! RDT wire codec — fixed-size DATA and ACK frames, big-endian layout.
//!
//! **DATA frame** (exactly [`MSS_VALUE`] = 8000 bytes):
//! ```text
//! Offset  Size    Field
//! ──────  ──────  ──────────────
//!   0       4     sequence number   (u32, big-endian)
//!   4       8     send timestamp    (f64 seconds since epoch, big-endian)
//!  12      16     checksum          (MD5, see `checksum`)
//!  28       4     payload length L  (u32, big-endian; L ≤ 7968)
//!  32       L     payload           (raw bytes)
//!  32+L  7968−L   padding           (ASCII space, ignored on receive)
//! ```
//!
//! **ACK frame** (exactly [`ACK_PACKET_SIZE`] = 12 bytes):
//! ```text
//!   0       4     sequence number   (u32, big-endian)
//!   4       8     send timestamp    (f64 seconds since epoch, big-endian)
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::checksum::{CHECKSUM_SIZE, data_checksum};
use crate::clock::unix_now;
use crate::error::RdtError;

/// Total on-the-wire size of every DATA frame.
pub const MSS_VALUE: usize = 8000;

/// Fixed DATA header: seq (4) + timestamp (8) + checksum (16) + length (4).
pub const DATA_HEADER_SIZE: usize = 4 + 8 + CHECKSUM_SIZE + 4;

/// Largest payload one DATA frame carries.
pub const UDP_MAX_CHUNK_SIZE: usize = MSS_VALUE - DATA_HEADER_SIZE;

/// Exact on-the-wire size of an ACK frame.
pub const ACK_PACKET_SIZE: usize = 12;

/// Byte used to pad short payloads out to the fixed frame size.
const PADDING_BYTE: u8 = b' ';

// ── DataFrame ────────────────────────────────────────────────────

/// A decoded DATA frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    /// Sequence number from the header.
    pub seq: u32,
    /// Peer wall-clock time at which the frame was encoded.
    pub sent_at: f64,
    /// Payload, or the corruption marker.
    pub body: FrameBody,
}

/// Body of a decoded DATA frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBody {
    /// Checksum verified; the payload is authoritative.
    Valid(Vec<u8>),
    /// Header parsed but the checksum did not match. The sequence number
    /// may be inspected; the payload must not be trusted.
    Corrupted,
}

impl DataFrame {
    /// Encode a DATA frame for `seq`, stamping the current wall-clock time.
    ///
    /// The result is always exactly [`MSS_VALUE`] bytes. Fails with
    /// [`RdtError::OversizedPayload`] if the payload does not fit.
    pub fn encode(seq: u32, payload: &[u8]) -> Result<Vec<u8>, RdtError> {
        Self::encode_at(seq, payload, unix_now())
    }

    /// Encode with an explicit timestamp (deterministic, for tests).
    fn encode_at(seq: u32, payload: &[u8], sent_at: f64) -> Result<Vec<u8>, RdtError> {
        if payload.len() > UDP_MAX_CHUNK_SIZE {
            return Err(RdtError::OversizedPayload {
                size: payload.len(),
                max: UDP_MAX_CHUNK_SIZE,
            });
        }

        let digest = data_checksum(seq, sent_at, payload);

        let mut buf = BytesMut::with_capacity(MSS_VALUE);
        buf.put_u32(seq);
        buf.put_f64(sent_at);
        buf.put_slice(&digest);
        buf.put_u32(payload.len() as u32);
        buf.put_slice(payload);
        buf.resize(MSS_VALUE, PADDING_BYTE);
        Ok(buf.to_vec())
    }

    /// Decode a DATA frame.
    ///
    /// A buffer that is not exactly [`MSS_VALUE`] bytes, or whose declared
    /// payload length exceeds [`UDP_MAX_CHUNK_SIZE`], is
    /// [`RdtError::MalformedFrame`]. A checksum mismatch is *not* an error:
    /// the frame decodes with [`FrameBody::Corrupted`] so the caller still
    /// sees which sequence number was damaged in flight.
    pub fn decode(bytes: &[u8]) -> Result<Self, RdtError> {
        if bytes.len() != MSS_VALUE {
            return Err(RdtError::MalformedFrame("DATA frame has the wrong size"));
        }

        let mut header = &bytes[..DATA_HEADER_SIZE];
        let seq = header.get_u32();
        let sent_at = header.get_f64();
        let mut digest = [0u8; CHECKSUM_SIZE];
        header.copy_to_slice(&mut digest);
        let length = header.get_u32() as usize;

        if length > UDP_MAX_CHUNK_SIZE {
            return Err(RdtError::MalformedFrame("declared payload length too large"));
        }

        let payload = &bytes[DATA_HEADER_SIZE..DATA_HEADER_SIZE + length];
        let body = if data_checksum(seq, sent_at, payload) == digest {
            FrameBody::Valid(payload.to_vec())
        } else {
            FrameBody::Corrupted
        };

        Ok(Self { seq, sent_at, body })
    }
}

// ── AckFrame ─────────────────────────────────────────────────────

/// A decoded ACK frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AckFrame {
    /// Sequence number being acknowledged.
    pub seq: u32,
    /// Wall-clock time the acknowledging side encoded the frame.
    pub sent_at: f64,
}

impl AckFrame {
    /// Encode an ACK for `seq`, stamping the current wall-clock time.
    pub fn encode(seq: u32) -> [u8; ACK_PACKET_SIZE] {
        let mut buf = [0u8; ACK_PACKET_SIZE];
        buf[0..4].copy_from_slice(&seq.to_be_bytes());
        buf[4..12].copy_from_slice(&unix_now().to_be_bytes());
        buf
    }

    /// Decode an ACK frame. Strict length check.
    pub fn decode(bytes: &[u8]) -> Result<Self, RdtError> {
        if bytes.len() != ACK_PACKET_SIZE {
            return Err(RdtError::MalformedFrame("ACK frame has the wrong size"));
        }
        let mut buf = bytes;
        let seq = buf.get_u32();
        let sent_at = buf.get_f64();
        Ok(Self { seq, sent_at })
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_roundtrip() {
        let wire = DataFrame::encode(7, b"payload bytes").unwrap();
        assert_eq!(wire.len(), MSS_VALUE);

        let frame = DataFrame::decode(&wire).unwrap();
        assert_eq!(frame.seq, 7);
        assert!(frame.sent_at > 0.0);
        assert_eq!(frame.body, FrameBody::Valid(b"payload bytes".to_vec()));
    }

    #[test]
    fn padding_is_ascii_space() {
        let wire = DataFrame::encode(0, b"abc").unwrap();
        assert!(wire[DATA_HEADER_SIZE + 3..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn empty_payload_roundtrip() {
        // The end-of-stream sentinel is an ordinary zero-length frame.
        let wire = DataFrame::encode(9999, b"").unwrap();
        assert_eq!(wire.len(), MSS_VALUE);

        let frame = DataFrame::decode(&wire).unwrap();
        assert_eq!(frame.seq, 9999);
        assert_eq!(frame.body, FrameBody::Valid(Vec::new()));
    }

    #[test]
    fn full_width_payload_roundtrip() {
        let payload = vec![0xA5u8; UDP_MAX_CHUNK_SIZE];
        let wire = DataFrame::encode(3, &payload).unwrap();
        assert_eq!(wire.len(), MSS_VALUE);

        let frame = DataFrame::decode(&wire).unwrap();
        assert_eq!(frame.body, FrameBody::Valid(payload));
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = vec![0u8; UDP_MAX_CHUNK_SIZE + 1];
        let err = DataFrame::encode(0, &payload).unwrap_err();
        assert!(matches!(err, RdtError::OversizedPayload { .. }));
    }

    #[test]
    fn wrong_total_length_is_malformed() {
        let wire = DataFrame::encode(1, b"x").unwrap();
        assert!(matches!(
            DataFrame::decode(&wire[..MSS_VALUE - 1]),
            Err(RdtError::MalformedFrame(_))
        ));
        let mut longer = wire.clone();
        longer.push(b' ');
        assert!(matches!(
            DataFrame::decode(&longer),
            Err(RdtError::MalformedFrame(_))
        ));
    }

    #[test]
    fn absurd_declared_length_is_malformed() {
        let mut wire = DataFrame::encode(1, b"x").unwrap();
        wire[28..32].copy_from_slice(&(UDP_MAX_CHUNK_SIZE as u32 + 1).to_be_bytes());
        assert!(matches!(
            DataFrame::decode(&wire),
            Err(RdtError::MalformedFrame(_))
        ));
    }

    #[test]
    fn flipped_payload_byte_is_corrupted_with_seq_intact() {
        let mut wire = DataFrame::encode_at(77, b"sensitive", 1234.5).unwrap();
        wire[DATA_HEADER_SIZE] ^= 0x01;

        let frame = DataFrame::decode(&wire).unwrap();
        assert_eq!(frame.seq, 77);
        assert_eq!(frame.body, FrameBody::Corrupted);
    }

    #[test]
    fn any_single_byte_flip_is_detected() {
        // Property 6: a flip anywhere in the header or payload must never
        // decode as a valid body.
        let payload = b"corruption sweep";
        let wire = DataFrame::encode_at(123, payload, 9876.25).unwrap();

        for pos in 0..DATA_HEADER_SIZE + payload.len() {
            let mut damaged = wire.clone();
            damaged[pos] ^= 0xFF;
            match DataFrame::decode(&damaged) {
                Ok(frame) => assert_eq!(
                    frame.body,
                    FrameBody::Corrupted,
                    "flip at {pos} slipped through"
                ),
                Err(RdtError::MalformedFrame(_)) => {}
                Err(other) => panic!("unexpected error for flip at {pos}: {other}"),
            }
        }
    }

    #[test]
    fn ack_roundtrip() {
        let wire = AckFrame::encode(42);
        assert_eq!(wire.len(), ACK_PACKET_SIZE);

        let ack = AckFrame::decode(&wire).unwrap();
        assert_eq!(ack.seq, 42);
        assert!(ack.sent_at > 0.0);
    }

    #[test]
    fn ack_wrong_length_is_malformed() {
        assert!(matches!(
            AckFrame::decode(&[0u8; ACK_PACKET_SIZE - 1]),
            Err(RdtError::MalformedFrame(_))
        ));
        assert!(matches!(
            AckFrame::decode(&[0u8; ACK_PACKET_SIZE + 1]),
            Err(RdtError::MalformedFrame(_))
        ));
    }
}
