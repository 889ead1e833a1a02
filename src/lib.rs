//! # bft-broadcast
//!
//! A layered Byzantine-tolerant broadcast stack for a fixed-membership, asynchronous
//! message-passing network of N processes, up to f of which may be Byzantine (3f < N).
//!
//! Three protocols are stacked, each strictly refining the delivery guarantees of the
//! layer below it:
//!
//! - [`dolev`] — Dolev reliable communication: floods envelopes and delivers once f+1
//!   node-disjoint paths from the source have been observed.
//! - [`bracha`] — Bracha reliable broadcast: the classical SEND/ECHO/READY three-phase
//!   protocol, built on top of Dolev delivery.
//! - [`rco`] — reliable causal order: vector-clock causal delivery, built on top of
//!   Bracha delivery.
//!
//! All three layers share one process, one per-message state table (see [`state`]) and
//! one transport handle (see [`transport`]); [`process::Process`] is the struct that owns
//! all of it and wires each layer's delivery event into the next layer's receive event.

pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod time;
pub mod transport;

mod bracha;
mod dolev;
mod malicious;
mod process;
mod rco;
mod state;

pub use config::{ClusterConfig, Configuration, MaliciousMode, NodeConfig, Optimisations};
pub use envelope::{Envelope, MsgId, Phase, ProcessId};
pub use process::{Process, DEFAULT_IDLE_TIMEOUT};
pub use transport::{SimulatedTransport, Transport};

pub mod cli;
