//! RCO — vector-clock causal delivery atop BRB (§4.3), plus the causal-queue
//! pipeline used to build deterministic multi-hop test scenarios.

use crate::envelope::{Envelope, Phase, ProcessId};
use crate::error::DispatchError;
use crate::process::Process;

fn vc_dominated(vc: &[u64], candidate: &[u64]) -> bool {
    vc.iter().zip(candidate.iter()).all(|(have, need)| have >= need)
}

impl Process {
    /// The application-facing entry point: stamps `content` with this process's
    /// current vector clock and this author's configured causal chain, if any.
    pub(crate) async fn rco_broadcast(&mut self, content: String) {
        let queue = self.causal_chain.get(&self.id).cloned().unwrap_or_default();
        self.rco_broadcast_with_queue(content, queue).await;
    }

    /// As [`Self::rco_broadcast`], but with an explicit causal queue — used both for
    /// top-level broadcasts with a configured chain and for pipeline continuations.
    pub(crate) async fn rco_broadcast_with_queue(&mut self, content: String, causal_queue: Vec<ProcessId>) {
        let msg_id = self.next_msg_id();
        let envelope = Envelope {
            content,
            msg_id,
            phase: Phase::Send,
            author_id: self.id,
            source_id: self.id,
            path: Vec::new(),
            vector_clock: self.vector_clock.clone(),
            causal_queue,
        };

        // The author RCO-delivers its own message synchronously, ahead of propagation.
        self.rco_deliver(envelope.clone()).await;
        self.brb_broadcast(envelope).await;
        self.vector_clock[self.id] += 1;
    }

    /// Upcall from BRB.deliver.
    pub(crate) async fn rco_on_brb_deliver(&mut self, envelope: Envelope) {
        if envelope.author_id == self.id {
            // Already delivered synchronously at broadcast time.
            return;
        }
        if envelope.vector_clock.len() != self.vector_clock.len() {
            let err = DispatchError::VectorClockLength(envelope.msg_id);
            log::warn!("process {}: dropping malformed envelope: {err}", self.id);
            return;
        }
        self.pending.push((envelope.author_id, envelope));
        self.drain_pending().await;
    }

    /// Fixpoint drain (§4.3): repeatedly deliver any pending envelope whose vector
    /// clock is dominated by ours, restarting the scan after each delivery.
    async fn drain_pending(&mut self) {
        loop {
            let ready_index = self
                .pending
                .iter()
                .position(|(_, envelope)| vc_dominated(&self.vector_clock, &envelope.vector_clock));

            let Some(index) = ready_index else {
                break;
            };
            let (author, envelope) = self.pending.remove(index);
            self.vector_clock[author] += 1;
            self.rco_deliver(envelope).await;
        }
    }

    async fn rco_deliver(&mut self, envelope: Envelope) {
        log::info!(
            "process {}: RCO-delivered msg {} from author {}: {:?}",
            self.id,
            envelope.msg_id,
            envelope.author_id,
            envelope.content
        );
        self.delivered
            .push((envelope.author_id, envelope.msg_id, envelope.content.clone()));
        self.run_causal_pipeline(&envelope).await;
    }

    /// Advances the causal pipeline (§4.3): pops every leading occurrence of `self.id`
    /// from the envelope's causal queue, scheduling one successor broadcast per pop.
    /// Only the final scheduled broadcast inherits the remaining tail; earlier ones
    /// start with an empty queue, so a single chain is preserved rather than forked.
    async fn run_causal_pipeline(&mut self, envelope: &Envelope) {
        let mut queue = envelope.causal_queue.clone();
        let mut pops = 0usize;
        while queue.first() == Some(&self.id) {
            queue.remove(0);
            pops += 1;
        }
        if pops == 0 {
            return;
        }

        for i in 0..pops {
            let queue_for_this = if i + 1 == pops { queue.clone() } else { Vec::new() };
            let content = format!("{}-relay-{}", self.id, envelope.msg_id);
            self.rco_broadcast_with_queue(content, queue_for_this).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::vc_dominated;

    #[test]
    fn dominated_clock_allows_delivery() {
        assert!(vc_dominated(&[1, 2, 0], &[1, 1, 0]));
    }

    #[test]
    fn missing_predecessor_blocks_delivery() {
        assert!(!vc_dominated(&[0, 0, 0], &[1, 0, 0]));
    }
}
