//! The per-message state table (§3). All three layers key on the same `msg_id`, so
//! this is a single map to a record carrying Dolev, Bracha and RCO fields — not three
//! separate tables per layer. `msg_id` is globally unique (see `envelope::MsgId`), so
//! per the spec's explicit allowance we key on it alone rather than on `(author_id,
//! msg_id)`.
//!
//! State is created lazily on first observation and retained for the process
//! lifetime; there is no GC in v1 (see the memory note in §5 and the open question
//! in §9).

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::envelope::{MsgId, ProcessId};

#[derive(Debug)]
pub(crate) struct MessageState {
    /// Observed node-disjoint-candidate path tuples (Dolev).
    pub(crate) paths: HashSet<Vec<ProcessId>>,
    pub(crate) dolev_delivered: bool,

    /// Distinct source ids an ECHO/READY has been Bracha-received from.
    pub(crate) echo_senders: HashSet<ProcessId>,
    pub(crate) ready_senders: HashSet<ProcessId>,
    pub(crate) sent_echo: bool,
    pub(crate) sent_ready: bool,
    pub(crate) brb_delivered: bool,

    /// When this process first observed any envelope for this msg_id; used only for
    /// the metrics sink's latency column, never for protocol logic.
    pub(crate) first_seen: Instant,
}

impl MessageState {
    fn new() -> Self {
        MessageState {
            paths: HashSet::new(),
            dolev_delivered: false,
            echo_senders: HashSet::new(),
            ready_senders: HashSet::new(),
            sent_echo: false,
            sent_ready: false,
            brb_delivered: false,
            first_seen: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MessageStore {
    entries: HashMap<MsgId, MessageState>,
}

impl MessageStore {
    pub(crate) fn new() -> Self {
        MessageStore::default()
    }

    /// Returns the entry for `msg_id`, creating it on first observation.
    pub(crate) fn entry(&mut self, msg_id: MsgId) -> &mut MessageState {
        self.entries.entry(msg_id).or_insert_with(MessageState::new)
    }
}
