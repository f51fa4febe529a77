use tokio::sync::oneshot;

use crate::ring::NodeId;

use super::SimulationStats;

/// Everything the supervisor actor can be asked to do.
#[derive(Debug)]
pub enum SupervisorMessage {
	/// Broadcast finger-table initialization and wait for every ack.
	InitializeNodes {
		/// Where to deliver the barrier outcome.
		reply: oneshot::Sender<InitResult>,
	},
	/// Run the full random-lookup workload.
	StartSimulation {
		/// Start nodes, visited in order; each issues the per-node quota.
		node_ids: Vec<NodeId>,
		/// Lookups issued from each start node.
		requests_per_node: u32,
		/// Where to deliver the outcome.
		reply: oneshot::Sender<SimulationResult>,
	},
	/// Run a single ad-hoc lookup.
	Lookup {
		/// The key to resolve.
		target: NodeId,
		/// Id of the node the lookup starts from.
		from_node: NodeId,
		/// Where to deliver the outcome.
		reply: oneshot::Sender<LookupResult>,
	},
	/// Reply with the number of ring participants.
	GetNodeCount {
		/// Where to deliver the count.
		reply: oneshot::Sender<usize>,
	},
	/// Terminate the supervisor.
	Shutdown,
}

/// Outcome of the init barrier.
#[derive(Debug)]
pub enum InitResult {
	/// Every node acked within its window.
	Complete,
	/// At least one ack was missed.
	Failed {
		/// Human-readable cause.
		reason: String,
	},
}

/// Outcome of the full workload.
#[derive(Debug)]
pub enum SimulationResult {
	/// The workload ran to the end; not every lookup necessarily
	/// succeeded, the statistics tell.
	Complete {
		/// Aggregate statistics of the run.
		stats: SimulationStats,
	},
	/// The workload could not run at all.
	Failed {
		/// Human-readable cause.
		reason: String,
	},
}

/// Outcome of a single ad-hoc lookup.
#[derive(Debug, Clone)]
pub enum LookupResult {
	/// The lookup resolved.
	Success {
		/// The key that was looked up.
		target: NodeId,
		/// Hop count attributed to the lookup.
		hops: u64,
		/// Id of the node found responsible for the key.
		found_at: NodeId,
	},
	/// The lookup failed or timed out.
	Failure {
		/// Human-readable cause.
		reason: String,
	},
}
