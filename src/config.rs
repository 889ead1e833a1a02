//! Cluster and per-node configuration, loaded from TOML the same way the rest of
//! this codebase loads configuration: a `serde`-deserializable struct plus a typed
//! [`ConfigError`] on top of the `config` crate.

use std::collections::HashMap;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::envelope::ProcessId;
use crate::error::ConfigError;

/// Byzantine-behaviour mode a process may be configured with. Off by default;
/// `Fabricate`/`Tamper` are test-harness knobs, never triggered by the protocol itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaliciousMode {
    #[default]
    Off,
    /// Emit a fabricated application message in place of the real one.
    Fabricate,
    /// Tamper with `content`/`msg_id` of received envelopes before forwarding.
    Tamper,
}

/// Configuration-gated protocol optimisations (default off). See §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Optimisations {
    #[serde(default)]
    pub o1: bool,
    #[serde(default)]
    pub o2: bool,
    #[serde(default)]
    pub o3: bool,
}

/// Cluster-wide parameters, identical at every process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Total process count.
    pub n: usize,
    /// Max Byzantine processes tolerated; must satisfy 3f < n.
    pub f: usize,
    /// Processes that broadcast at startup.
    #[serde(default)]
    pub starter_nodes: Vec<ProcessId>,
    /// Per-process count of initial application broadcasts.
    #[serde(default)]
    pub broadcast_schedule: HashMap<ProcessId, usize>,
    /// Author -> chain of successor broadcasters (causal pipeline, §4.3).
    #[serde(default)]
    pub causal_chain: HashMap<ProcessId, Vec<ProcessId>>,
    #[serde(default)]
    pub optimisations: Optimisations,
    /// Per-process Byzantine-behaviour override, used by the simulation binary to
    /// build every process's [`NodeConfig`] from a single scenario file instead of
    /// N separate per-node files. Absent entries default to `Off`.
    #[serde(default)]
    pub malicious: HashMap<ProcessId, MaliciousMode>,
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if 3 * self.f >= self.n {
            return Err(ConfigError::InvalidFaultTolerance {
                f: self.f,
                n: self.n,
            });
        }
        Ok(())
    }

    /// Builds one [`NodeConfig`] per process in `[0, n)`, full-mesh peered (every
    /// process is reachable from every other), with `malicious_mode` taken from
    /// `self.malicious`. Used by the `run` CLI command to drive a whole simulated
    /// cluster from a single scenario file.
    pub fn node_configs(&self) -> Vec<NodeConfig> {
        (0..self.n)
            .map(|id| NodeConfig {
                id,
                peers: (0..self.n).filter(|&peer| peer != id).collect(),
                malicious_mode: self.malicious.get(&id).copied().unwrap_or_default(),
            })
            .collect()
    }
}

/// Parameters specific to this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: ProcessId,
    pub peers: Vec<ProcessId>,
    #[serde(default)]
    pub malicious_mode: MaliciousMode,
}

impl NodeConfig {
    pub fn validate(&self, cluster: &ClusterConfig) -> Result<(), ConfigError> {
        if self.id >= cluster.n {
            return Err(ConfigError::ProcessIdOutOfRange {
                id: self.id,
                n: cluster.n,
            });
        }
        Ok(())
    }
}

/// Full configuration for one simulated process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub cluster: ClusterConfig,
    pub node: NodeConfig,
}

impl Configuration {
    /// Loads and validates configuration from a TOML file. Invalid fault-tolerance
    /// parameters (f >= N/3) are rejected here, never as a panic at runtime.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        let configuration: Configuration = built.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cluster.validate()?;
        self.node.validate(&self.cluster)?;
        Ok(())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let serialized = toml::to_string(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cluster() -> ClusterConfig {
        ClusterConfig {
            n: 4,
            f: 1,
            starter_nodes: vec![0],
            broadcast_schedule: HashMap::from([(0, 1)]),
            causal_chain: HashMap::new(),
            optimisations: Optimisations::default(),
            malicious: HashMap::new(),
        }
    }

    #[test]
    fn rejects_f_too_large() {
        let mut cluster = base_cluster();
        cluster.f = 2; // 3*2 = 6 >= 4
        assert!(matches!(
            cluster.validate(),
            Err(ConfigError::InvalidFaultTolerance { .. })
        ));
    }

    #[test]
    fn accepts_boundary_fault_tolerance() {
        let cluster = ClusterConfig {
            n: 7,
            f: 2, // 3*2 = 6 < 7
            ..base_cluster()
        };
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_node_id() {
        let cluster = base_cluster();
        let node = NodeConfig {
            id: 4,
            peers: vec![0, 1, 2],
            malicious_mode: MaliciousMode::Off,
        };
        assert!(matches!(
            node.validate(&cluster),
            Err(ConfigError::ProcessIdOutOfRange { .. })
        ));
    }
}
