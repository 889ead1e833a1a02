//! Full-cluster integration scenarios (S1-S5; S6 is a white-box threshold test
//! colocated with the Bracha layer, see `src/bracha.rs`), driving real `Process`
//! instances over the in-process `SimulatedTransport`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bft_broadcast::config::{ClusterConfig, Configuration, MaliciousMode, Optimisations};
use bft_broadcast::metrics::MetricsSink;
use bft_broadcast::transport::SimulatedTransport;
use bft_broadcast::Process;

const TEST_IDLE_TIMEOUT: Duration = Duration::from_millis(150);

/// Spins up one task per configured process, runs each starter's schedule, and
/// waits for every process to go idle. Returns the finished processes keyed by id.
async fn run_cluster(cluster: ClusterConfig) -> HashMap<usize, Process> {
    let ids: Vec<usize> = (0..cluster.n).collect();
    let (transport, mut receivers) = SimulatedTransport::new(&ids);
    let transport: Arc<SimulatedTransport> = Arc::new(transport);

    let starters = cluster.starter_nodes.clone();
    let schedule = cluster.broadcast_schedule.clone();

    let mut handles = Vec::new();
    for node in cluster.node_configs() {
        let id = node.id;
        let inbound = receivers.remove(&id).expect("receiver for every configured id");
        let configuration = Configuration {
            cluster: cluster.clone(),
            node,
        };
        let mut process = Process::new(&configuration, transport.clone(), MetricsSink::disabled());
        let count = schedule.get(&id).copied().unwrap_or(0);
        let is_starter = starters.contains(&id);

        handles.push(tokio::spawn(async move {
            if is_starter && count > 0 {
                process.run_schedule(count).await;
            }
            process.run(inbound, TEST_IDLE_TIMEOUT).await;
            process
        }));
    }
    drop(transport);

    let mut result = HashMap::new();
    for handle in handles {
        let process = handle.await.expect("process task panicked");
        result.insert(process.id(), process);
    }
    result
}

fn honest_cluster(n: usize, f: usize, starters: Vec<usize>, schedule: HashMap<usize, usize>) -> ClusterConfig {
    ClusterConfig {
        n,
        f,
        starter_nodes: starters,
        broadcast_schedule: schedule,
        causal_chain: HashMap::new(),
        optimisations: Optimisations::default(),
        malicious: HashMap::new(),
    }
}

#[tokio::test]
async fn s1_happy_path() {
    let cluster = honest_cluster(4, 1, vec![0], HashMap::from([(0, 1)]));
    let processes = run_cluster(cluster).await;

    assert_eq!(processes.len(), 4);
    for id in 0..4 {
        let process = &processes[&id];
        assert_eq!(process.delivered(), &[(0, 0u64, "0-0".to_string())]);
        assert_eq!(process.vector_clock(), &[1, 0, 0, 0]);
    }
}

#[tokio::test]
async fn s2_byzantine_author_omission_is_all_or_nothing() {
    let cluster = honest_cluster(7, 2, vec![0], HashMap::from([(0, 1)]));
    let cluster = ClusterConfig {
        malicious: HashMap::from([(0, MaliciousMode::Fabricate)]),
        ..cluster
    };
    let processes = run_cluster(cluster).await;

    let honest_deliveries = (1..7)
        .filter(|id| processes[id].delivered().iter().any(|(author, ..)| *author == 0))
        .count();

    assert!(
        honest_deliveries == 0 || honest_deliveries == 6,
        "agreement violated: {honest_deliveries}/6 honest processes delivered"
    );
}

#[tokio::test]
async fn s3_tampering_does_not_corrupt_the_original() {
    let cluster = honest_cluster(7, 2, vec![0], HashMap::from([(0, 1)]));
    let cluster = ClusterConfig {
        malicious: HashMap::from([(6, MaliciousMode::Tamper)]),
        ..cluster
    };
    let processes = run_cluster(cluster).await;

    for id in (0..7).filter(|&id| id != 6) {
        let process = &processes[&id];
        let has_original = process
            .delivered()
            .iter()
            .any(|(author, _, content)| *author == 0 && content == "0-0");
        assert!(has_original, "process {id} never delivered the untampered original");
    }
}

#[tokio::test]
async fn s4_causal_pipeline_chain() {
    let causal_chain = HashMap::from([(0, vec![8, 8, 9, 6, 4])]);
    let cluster = ClusterConfig {
        causal_chain,
        ..honest_cluster(10, 0, vec![0], HashMap::from([(0, 1)]))
    };
    let processes = run_cluster(cluster).await;

    let mut expected = vec![0u64; 10];
    expected[0] = 1;
    expected[4] = 1;
    expected[6] = 1;
    expected[8] = 2;
    expected[9] = 1;

    for id in 0..10 {
        assert_eq!(processes[&id].vector_clock(), expected.as_slice(), "process {id}");
    }
}

#[tokio::test]
async fn s5_concurrent_broadcasters_both_delivered_everywhere() {
    let cluster = honest_cluster(10, 0, vec![0, 1], HashMap::from([(0, 1), (1, 1)]));
    let processes = run_cluster(cluster).await;

    for id in 0..10 {
        let process = &processes[&id];
        assert_eq!(process.delivered().len(), 2, "process {id}");
        assert!(process.delivered().iter().any(|(a, _, c)| *a == 0 && c == "0-0"));
        assert!(process.delivered().iter().any(|(a, _, c)| *a == 1 && c == "1-0"));
    }
}
