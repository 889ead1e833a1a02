//! Wire envelope shared by all three layers of the stack.

use serde::{Deserialize, Serialize};

/// Index of a process in `[0, N)`. Stable for the lifetime of the cluster.
pub type ProcessId = usize;

/// Globally unique id of an *original* application message. Preserved across every
/// layer re-wrapping of the envelope (SEND -> ECHO -> READY); never incremented
/// per-rebroadcast (see the "message id hygiene" design note).
pub type MsgId = u64;

/// Which of the three Bracha phases an envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Send,
    Echo,
    Ready,
}

/// The object propagated by the Dolev flood and re-wrapped at each Bracha phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Opaque application payload.
    pub content: String,
    /// Id of the original application message; stable across all re-wrappings.
    pub msg_id: MsgId,
    /// Current Bracha phase.
    pub phase: Phase,
    /// Process that invoked `rco_broadcast`.
    pub author_id: ProcessId,
    /// Process that most recently rebroadcast this envelope at the Bracha layer.
    pub source_id: ProcessId,
    /// Hops traversed at the Dolev layer since the last Bracha rebroadcast.
    pub path: Vec<ProcessId>,
    /// Snapshot of the author's vector clock at broadcast time.
    pub vector_clock: Vec<u64>,
    /// Successor processes that must each broadcast next (causal pipeline).
    pub causal_queue: Vec<ProcessId>,
}

impl Envelope {
    /// `new_path` per the Dolev receive rule: the path so far with the forwarding
    /// peer appended.
    pub(crate) fn appended_path(&self, from: ProcessId) -> Vec<ProcessId> {
        let mut path = self.path.clone();
        path.push(from);
        path
    }
}
