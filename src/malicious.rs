//! Byzantine behaviour injection (§4.1). Test-harness-controlled configuration, not
//! part of the correctness contract: a malicious process either fabricates its own
//! application message or tampers with envelopes it forwards, and always caps its
//! outbound fan-out at f peers.

use crate::config::MaliciousMode;
use crate::envelope::Envelope;

pub(crate) fn fabricate(envelope: &Envelope) -> Envelope {
    Envelope {
        content: "fake news!".to_string(),
        msg_id: envelope.msg_id.wrapping_add(1 << 48),
        ..envelope.clone()
    }
}

/// Tampering mutates both `content` and `msg_id` (matching `mal_modify_msg` in the
/// source design, which re-derives the message id from the tampered content). This
/// forks the corrupted copy onto its own state-table entry instead of polluting the
/// original message's path/echo/ready counters, so honest disjoint paths around the
/// tamperer still carry the real content to its own, uncorrupted delivery.
pub(crate) fn tamper(envelope: &Envelope) -> Envelope {
    Envelope {
        content: format!("fake behaviour set on: {}", envelope.content),
        msg_id: envelope.msg_id.wrapping_add(1 << 56),
        ..envelope.clone()
    }
}

/// Applies `mode` to an outbound envelope just prior to flooding it, per the
/// configured behaviour. `Off` is the identity.
pub(crate) fn apply(mode: MaliciousMode, envelope: Envelope) -> Envelope {
    match mode {
        MaliciousMode::Off => envelope,
        MaliciousMode::Fabricate => fabricate(&envelope),
        MaliciousMode::Tamper => tamper(&envelope),
    }
}
