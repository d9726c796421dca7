//! Wall-clock timestamps in the wire representation.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as IEEE-754 seconds since the Unix epoch.
///
/// Both packet kinds carry their send time in this form, and the receiver
/// stamps arrivals with it so the two ends of a timing pair share a
/// representation.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock set before the Unix epoch")
        .as_secs_f64()
}
