//! Append-only CSV metrics sink (§6), one row per BRB-delivery:
//! `node_id,N,f,peer_count,latency_seconds,delta_message_count`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Writes one CSV row per BRB-delivery. `delta_message_count` is the number of
/// envelopes this process has sent via the transport since the previous delivery.
pub struct MetricsSink {
    path: Option<PathBuf>,
    messages_sent: u64,
    last_recorded_sent: u64,
}

impl MetricsSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        MetricsSink {
            path,
            messages_sent: 0,
            last_recorded_sent: 0,
        }
    }

    pub fn disabled() -> Self {
        MetricsSink::new(None)
    }

    pub(crate) fn record_send(&mut self) {
        self.messages_sent += 1;
    }

    pub(crate) fn record_delivery(
        &mut self,
        node_id: usize,
        n: usize,
        f: usize,
        peer_count: usize,
        latency: Duration,
    ) {
        let delta = self.messages_sent - self.last_recorded_sent;
        self.last_recorded_sent = self.messages_sent;

        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_row(path, node_id, n, f, peer_count, latency.as_secs_f64(), delta) {
            log::warn!("failed to write metrics row: {e}");
        }
    }
}

fn append_row(
    path: &Path,
    node_id: usize,
    n: usize,
    f: usize,
    peer_count: usize,
    latency_seconds: f64,
    delta_message_count: u64,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "{node_id},{n},{f},{peer_count},{latency_seconds:.6},{delta_message_count}"
    )
}
