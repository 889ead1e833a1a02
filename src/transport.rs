//! The transport layer is an external collaborator (§6): authenticated, per-pair FIFO
//! unicast. This module provides the trait plus the simplest implementation that
//! honors that contract — in-process channels — for the simulation binary and tests.
//! A real deployment would swap this for an actual networked transport without any
//! change to [`crate::process::Process`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::envelope::{Envelope, ProcessId};

/// `send` is best-effort: the spec assigns retries to Dolev's redundant flood, not
/// to the transport.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, from: ProcessId, to: ProcessId, envelope: Envelope);
}

/// One unbounded channel per recipient; FIFO per ordered pair is automatic because
/// every sender writes into the same channel for a given destination.
pub struct SimulatedTransport {
    senders: HashMap<ProcessId, mpsc::UnboundedSender<(ProcessId, Envelope)>>,
}

impl SimulatedTransport {
    /// Builds a transport wired for `ids` and returns, alongside it, the inbound
    /// receiver for every process so callers can drive each process's dispatch loop.
    pub fn new(
        ids: &[ProcessId],
    ) -> (Self, HashMap<ProcessId, mpsc::UnboundedReceiver<(ProcessId, Envelope)>>) {
        let mut senders = HashMap::with_capacity(ids.len());
        let mut receivers = HashMap::with_capacity(ids.len());
        for &id in ids {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(id, tx);
            receivers.insert(id, rx);
        }
        (SimulatedTransport { senders }, receivers)
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn send(&self, from: ProcessId, to: ProcessId, envelope: Envelope) {
        if let Some(tx) = self.senders.get(&to) {
            // An unreachable/closed peer is logged and dropped, never retried here.
            if tx.send((from, envelope)).is_err() {
                log::warn!("process {from}: peer {to} is no longer reachable");
            }
        } else {
            log::warn!("process {from}: unknown peer {to}");
        }
    }
}
