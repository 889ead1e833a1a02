//! Error kinds for the stack. Per §7 of the design, nothing propagates out of a
//! handler: dispatch errors are logged and the triggering envelope is dropped.

use thiserror::Error;

use crate::envelope::MsgId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malicious process count f={f} must satisfy 3f < N (N={n})")]
    InvalidFaultTolerance { f: usize, n: usize },
    #[error("process id {id} is out of range for a cluster of size {n}")]
    ProcessIdOutOfRange { id: usize, n: usize },
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Malformed-envelope cases from §7. Logged at warning and the envelope is dropped.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("envelope for msg {0} carries a vector clock of the wrong length")]
    VectorClockLength(MsgId),
}
