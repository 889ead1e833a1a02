//! DolevRC — reliable propagation over node-disjoint paths (§4.1). This is the floor
//! of the stack: it does not interpret `phase`, it only floods and counts paths,
//! upcalling to the Bracha layer once enough disjoint routes have been observed.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::envelope::{Envelope, ProcessId};
use crate::malicious;
use crate::process::Process;

impl Process {
    /// Floods `envelope` to every peer with an empty path, then delivers to self
    /// immediately: the source is trivially reachable from itself via f+1 disjoint
    /// (zero-hop) paths.
    pub(crate) async fn dolev_broadcast(&mut self, envelope: Envelope) {
        self.flood(&envelope, &[], self.is_malicious()).await;
        self.dolev_deliver(envelope).await;
    }

    /// Receive-side of the flood, invoked once per inbound envelope from peer `from`.
    pub(crate) async fn dolev_on_receive(&mut self, from: ProcessId, envelope: Envelope) {
        let new_path = envelope.appended_path(from);
        let msg_id = envelope.msg_id;

        let already_delivered = {
            let state = self.store.entry(msg_id);
            state.paths.insert(new_path.clone());
            state.dolev_delivered
        };

        let mut forwarded = envelope;
        forwarded.path = new_path.clone();
        // The fan-out cap (§4.1) only binds a malicious process's own broadcasts;
        // relaying an already-in-flight message is uncapped, matching the source
        // design (only `on_broadcast` restricts fan-out, `on_message` does not).
        self.flood(&forwarded, &new_path, false).await;

        // A malicious process never triggers its own upward delivery (it has no
        // honest interest in the protocol completing) but still floods and tracks
        // paths so the disjoint-path count it contributes to its peers is accurate.
        if already_delivered || self.is_malicious() {
            return;
        }

        let satisfied = {
            let state = self.store.entry(msg_id);
            disjoint_paths_ok(&state.paths, self.f)
        };
        if satisfied {
            self.store.entry(msg_id).dolev_delivered = true;
            self.dolev_deliver(forwarded).await;
        }
    }

    /// Upcall to the Bracha layer, which dispatches further by `phase`.
    pub(crate) async fn dolev_deliver(&mut self, envelope: Envelope) {
        self.brb_on_deliver(envelope).await;
    }

    /// Sends `envelope` to every peer not in `exclude`. When `cap_fanout` is set
    /// (a malicious process's own broadcast, §4.1) the peer set is randomly
    /// restricted to at most f recipients.
    async fn flood(&mut self, envelope: &Envelope, exclude: &[ProcessId], cap_fanout: bool) {
        let mut targets: Vec<ProcessId> = self
            .peers
            .iter()
            .copied()
            .filter(|peer| !exclude.contains(peer))
            .collect();
        if cap_fanout {
            targets.shuffle(&mut rand::thread_rng());
            targets.truncate(self.f);
        }
        for peer in targets {
            self.send_envelope(peer, envelope.clone()).await;
        }
    }

    async fn send_envelope(&mut self, to: ProcessId, envelope: Envelope) {
        let envelope = malicious::apply(self.malicious_mode, envelope);
        self.metrics.record_send();
        self.transport.send(self.id, to, envelope).await;
    }
}

/// The disjoint-paths predicate (§4.1): sort candidate paths shortest-first, greedily
/// select a path whose interior (everything but the original source at index 0) is
/// disjoint from the union of previously selected interiors, and return true once
/// f+1 have been selected.
pub(crate) fn disjoint_paths_ok(paths: &HashSet<Vec<ProcessId>>, f: usize) -> bool {
    let mut candidates: Vec<&Vec<ProcessId>> = paths.iter().collect();
    candidates.sort_by_key(|path| path.len());

    let mut used_interior: HashSet<ProcessId> = HashSet::new();
    let mut selected = 0usize;

    for path in candidates {
        let interior = &path[1..];
        if interior.iter().any(|node| used_interior.contains(node)) {
            continue;
        }
        used_interior.extend(interior.iter().copied());
        selected += 1;
        if selected >= f + 1 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(nodes: &[ProcessId]) -> Vec<ProcessId> {
        nodes.to_vec()
    }

    #[test]
    fn fewer_than_f_plus_1_disjoint_paths_fails() {
        let mut paths = HashSet::new();
        paths.insert(path(&[0, 1]));
        paths.insert(path(&[0, 1, 2])); // shares interior node 1 with the above
        assert!(!disjoint_paths_ok(&paths, 1));
    }

    #[test]
    fn f_plus_1_disjoint_paths_succeeds() {
        let mut paths = HashSet::new();
        paths.insert(path(&[0, 1]));
        paths.insert(path(&[0, 2]));
        assert!(disjoint_paths_ok(&paths, 1));
    }

    #[test]
    fn shared_source_does_not_count_against_disjointness() {
        // Both paths begin at source 0; only the interior after it must be disjoint.
        let mut paths = HashSet::new();
        paths.insert(path(&[0, 1]));
        paths.insert(path(&[0, 2]));
        paths.insert(path(&[0, 1, 3])); // interior [1,3] intersects the first path's [1]
        assert!(disjoint_paths_ok(&paths, 1));
    }
}
