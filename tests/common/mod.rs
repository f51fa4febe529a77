use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chord_sim::node::{self, message::NodeMessage, NodeHandle, Registry};
use chord_sim::{ring, NodeId, Supervisor, SupervisorHandle};
use tokio::sync::mpsc;

/// Generous wait for direct queries against otherwise idle nodes.
pub const QUERY_WAIT: Duration = Duration::from_secs(1);

/// Spawns and initializes a bare ring of `n` node actors, without a
/// supervisor in front of them.
pub async fn make_ring_nodes(n: usize) -> (Registry, Vec<NodeId>) {
	let mut registry = BTreeMap::new();
	for id in ring::evenly_spaced_ids(n) {
		registry.insert(id, node::spawn(id));
	}
	let registry: Registry = Arc::new(registry);

	let (ack_tx, mut ack_rx) = mpsc::channel(n);
	for handle in registry.values() {
		handle
			.send(NodeMessage::InitFingerTable { registry: registry.clone(), ack: ack_tx.clone() })
			.await;
	}
	drop(ack_tx);

	let mut acks = 0;
	while ack_rx.recv().await.is_some() {
		acks += 1;
	}
	assert_eq!(acks, n, "every node should ack initialization");

	let ids = registry.keys().copied().collect();
	(registry, ids)
}

/// Spawns a supervised ring, initialized and ready for lookups.
pub async fn make_supervised_ring(n: usize) -> SupervisorHandle {
	let handle = Supervisor::spawn(n);
	handle.initialize().await.expect("ring should initialize");
	handle
}

/// Resolves the id a handle answers to.
pub async fn id_of(handle: &NodeHandle) -> NodeId {
	handle.id(QUERY_WAIT).await.expect("node should report its id")
}
