//! BRB — Bracha's three-phase reliable broadcast (§4.2), layered atop DolevRC.
//! `o2`/`o3` in [`crate::config::Optimisations`] are reserved and intentionally
//! unused here: the open question around O1's combined ECHO+READY branch is
//! resolved (see DESIGN.md) by never synthesizing an ECHO a process hasn't earned.

use crate::envelope::{Envelope, MsgId, Phase};
use crate::process::Process;
use crate::time::ProcessTime;

/// `⌈(N+f+1)/2⌉`, computed without floating point.
fn echo_threshold(n: usize, f: usize) -> usize {
    (n + f + 2) / 2
}

impl Process {
    /// BRB's own `broadcast`: wraps nothing further, `envelope` already carries
    /// `phase = Send`, and hands straight to DolevRC.
    pub(crate) async fn brb_broadcast(&mut self, envelope: Envelope) {
        self.dolev_broadcast(envelope).await;
    }

    /// Upcall from DolevRC.deliver; dispatches by phase per §4.4.
    pub(crate) async fn brb_on_deliver(&mut self, envelope: Envelope) {
        match envelope.phase {
            Phase::Send => self.brb_on_send(envelope).await,
            Phase::Echo => self.brb_on_echo(envelope).await,
            Phase::Ready => self.brb_on_ready(envelope).await,
        }
    }

    async fn brb_on_send(&mut self, envelope: Envelope) {
        let msg_id = envelope.msg_id;
        let sent_echo = self.store.entry(msg_id).sent_echo;
        if sent_echo {
            return;
        }
        self.store.entry(msg_id).sent_echo = true;
        let echo = Envelope {
            phase: Phase::Echo,
            source_id: self.id,
            path: Vec::new(),
            ..envelope
        };
        self.dolev_broadcast(echo).await;
    }

    async fn brb_on_echo(&mut self, envelope: Envelope) {
        let msg_id = envelope.msg_id;
        let count = {
            let state = self.store.entry(msg_id);
            state.echo_senders.insert(envelope.source_id);
            state.echo_senders.len()
        };

        self.maybe_apply_o1(&envelope).await;

        let sent_ready = self.store.entry(msg_id).sent_ready;
        if !sent_ready && count >= echo_threshold(self.n, self.f) {
            self.send_ready(&envelope).await;
        }
    }

    async fn brb_on_ready(&mut self, envelope: Envelope) {
        let msg_id = envelope.msg_id;
        let count = {
            let state = self.store.entry(msg_id);
            state.ready_senders.insert(envelope.source_id);
            state.ready_senders.len()
        };

        self.maybe_apply_o1(&envelope).await;

        let sent_ready = self.store.entry(msg_id).sent_ready;
        if !sent_ready && count >= self.f + 1 {
            self.send_ready(&envelope).await;
        }

        let brb_delivered = self.store.entry(msg_id).brb_delivered;
        if !brb_delivered && count >= 2 * self.f + 1 {
            self.deliver_brb(envelope, msg_id).await;
        }
    }

    async fn send_ready(&mut self, envelope: &Envelope) {
        self.store.entry(envelope.msg_id).sent_ready = true;
        let ready = Envelope {
            phase: Phase::Ready,
            source_id: self.id,
            path: Vec::new(),
            ..envelope.clone()
        };
        self.dolev_broadcast(ready).await;
    }

    /// O1 amplification (§4.2): if the honest-majority echo threshold has already
    /// been reached but this process hasn't echoed yet, echo immediately rather than
    /// waiting on the full `(N+f+1)/2` threshold.
    async fn maybe_apply_o1(&mut self, envelope: &Envelope) {
        if !self.optimisations.o1 {
            return;
        }
        let msg_id = envelope.msg_id;
        let (sent_echo, echo_count) = {
            let state = self.store.entry(msg_id);
            (state.sent_echo, state.echo_senders.len())
        };
        if sent_echo || echo_count < self.f + 1 {
            return;
        }
        self.store.entry(msg_id).sent_echo = true;
        let echo = Envelope {
            phase: Phase::Echo,
            source_id: self.id,
            path: Vec::new(),
            ..envelope.clone()
        };
        self.dolev_broadcast(echo).await;
    }

    async fn deliver_brb(&mut self, envelope: Envelope, msg_id: MsgId) {
        self.store.entry(msg_id).brb_delivered = true;
        let latency = self.store.entry(msg_id).first_seen.elapsed();
        self.metrics
            .record_delivery(self.id, self.n, self.f, self.peers.len(), latency);

        let delivered = Envelope {
            phase: Phase::Send,
            source_id: envelope.author_id,
            path: Vec::new(),
            ..envelope
        };
        log::info!(
            "process {}: BRB-delivered msg {} from author {} at {}",
            self.id,
            delivered.msg_id,
            delivered.author_id,
            ProcessTime::now().to_rfc3339(),
        );
        self.rco_on_brb_deliver(delivered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Process;

    fn echo(msg_id: MsgId, source_id: usize) -> Envelope {
        Envelope {
            content: "A".to_string(),
            msg_id,
            phase: Phase::Echo,
            author_id: 2,
            source_id,
            path: Vec::new(),
            vector_clock: vec![0; 4],
            causal_queue: Vec::new(),
        }
    }

    /// S6: at N=4, f=1 the ECHO->READY threshold is ⌈(N+f+1)/2⌉ = 3. Two distinct
    /// ECHOes must not trigger READY; a third must.
    #[tokio::test]
    async fn echo_threshold_boundary_at_n4_f1() {
        let mut process = Process::test_instance(0, 4, 1);

        process.brb_on_echo(echo(1, 1)).await;
        assert!(!process.store.entry(1).sent_ready);

        process.brb_on_echo(echo(1, 2)).await;
        assert!(!process.store.entry(1).sent_ready);

        process.brb_on_echo(echo(1, 3)).await;
        assert!(process.store.entry(1).sent_ready);
    }
}
