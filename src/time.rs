//! Wall-clock time helper, in the style of `utilities::time::EphemeraTime`: used for
//! human-readable logging only, never for protocol logic (§5 — the protocols measure
//! latency with a monotonic clock, see [`crate::state::MessageState::first_seen`]).

use chrono::{DateTime, Utc};

pub struct ProcessTime;

impl ProcessTime {
    pub fn now() -> DateTime<Utc> {
        Utc::now()
    }
}
