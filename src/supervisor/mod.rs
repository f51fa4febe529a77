//! The supervisor actor: builds the ring, drives the init barrier and
//! the lookup workload, and aggregates statistics.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::node::{self, message::NodeMessage, Registry};
use crate::ring::{self, NodeId};

/// Messages the supervisor understands, and their reply payloads.
pub mod message;
mod stats;
mod workload;

pub use stats::SimulationStats;

use message::{InitResult, LookupResult, SimulationResult, SupervisorMessage};

/// Bounded wait for each individual ack during the init barrier,
/// generous so very large rings initialize without spurious failures.
const ACK_WAIT: Duration = Duration::from_secs(50);

/// Bounded wait for one top-level lookup.
const LOOKUP_WAIT: Duration = Duration::from_secs(5);

/// Outer ceiling on the whole init barrier.
const INIT_CEILING: Duration = Duration::from_secs(90);

/// Outer ceiling on the whole workload.
const SIMULATION_CEILING: Duration = Duration::from_secs(180);

/// The supervisor's actor state: the immutable participant map and the
/// ring size.
pub struct Supervisor {
	registry: Registry,
	node_count: usize,
}

impl Supervisor {
	/// Creates the node actors for `num_nodes` evenly spaced ids, then
	/// starts the supervisor actor over them and returns its handle.
	pub fn spawn(num_nodes: usize) -> SupervisorHandle {
		let mut registry = BTreeMap::new();
		for id in ring::evenly_spaced_ids(num_nodes) {
			registry.insert(id, node::spawn(id));
		}
		let node_ids = registry.keys().copied().collect();
		let node_count = registry.len();
		let supervisor = Supervisor {
			registry: Arc::new(registry),
			node_count,
		};
		info!(nodes = node_count, "ring participants spawned");

		let (tx, rx) = mpsc::channel(50);
		tokio::spawn(supervisor.run(rx));
		SupervisorHandle { tx, node_ids }
	}

	async fn run(self, mut inbox: mpsc::Receiver<SupervisorMessage>) {
		while let Some(msg) = inbox.recv().await {
			match msg {
				SupervisorMessage::InitializeNodes { reply } => {
					let _ = reply.send(self.initialize_nodes().await);
				},
				SupervisorMessage::StartSimulation { node_ids, requests_per_node, reply } => {
					let _ = reply.send(self.run_workload(&node_ids, requests_per_node).await);
				},
				SupervisorMessage::Lookup { target, from_node, reply } => {
					let _ = reply.send(self.lookup(target, from_node).await);
				},
				SupervisorMessage::GetNodeCount { reply } => {
					let _ = reply.send(self.node_count);
				},
				SupervisorMessage::Shutdown => break,
			}
		}
		debug!("supervisor terminating");
	}

	/// Broadcasts `InitFingerTable` to every node over a single shared
	/// ack mailbox, then counts exactly N acks.
	///
	/// The barrier cares only about the count; ack order is irrelevant.
	async fn initialize_nodes(&self) -> InitResult {
		let (ack_tx, mut ack_rx) = mpsc::channel(self.node_count.max(1));
		for node in self.registry.values() {
			node.send(NodeMessage::InitFingerTable {
				registry: self.registry.clone(),
				ack: ack_tx.clone(),
			})
			.await;
		}
		drop(ack_tx);

		for seen in 0..self.node_count {
			match timeout(ACK_WAIT, ack_rx.recv()).await {
				Ok(Some(ack)) => {
					debug!(node = ack.id, "finger table ready");
				},
				Ok(None) => {
					return InitResult::Failed {
						reason: format!(
							"nodes stopped acking after {seen} of {} initializations",
							self.node_count
						),
					};
				},
				Err(_) => {
					return InitResult::Failed {
						reason: format!(
							"timed out waiting for initialization ack {} of {}",
							seen + 1,
							self.node_count
						),
					};
				},
			}
		}
		info!(nodes = self.node_count, "ring initialized");
		InitResult::Complete
	}

	/// Resolves a single ad-hoc lookup starting at `from_node`.
	async fn lookup(&self, target: NodeId, from_node: NodeId) -> LookupResult {
		let Some(start) = self.registry.get(&from_node) else {
			return LookupResult::Failure {
				reason: format!("no node {from_node} in the registry"),
			};
		};
		match start.find_successor(target, LOOKUP_WAIT).await {
			Ok(found) => LookupResult::Success {
				target,
				hops: stats::estimated_hops(self.node_count),
				found_at: found.id,
			},
			Err(err) => {
				warn!(target, from_node, %err, "lookup failed");
				LookupResult::Failure { reason: err.to_string() }
			},
		}
	}
}

/// A connection to a running supervisor.
///
/// All methods are thin request-reply wrappers over the supervisor's
/// inbox; the init and simulation calls additionally enforce the outer
/// wall-clock ceilings.
pub struct SupervisorHandle {
	tx: mpsc::Sender<SupervisorMessage>,
	node_ids: Vec<NodeId>,
}

impl SupervisorHandle {
	/// Ids of all ring participants, ascending.
	pub fn node_ids(&self) -> &[NodeId] {
		&self.node_ids
	}

	/// Runs the init barrier to completion.
	pub async fn initialize(&self) -> Result<(), SimError> {
		match self.request(Some(INIT_CEILING), |reply| SupervisorMessage::InitializeNodes { reply }).await? {
			InitResult::Complete => Ok(()),
			InitResult::Failed { reason } => Err(SimError::Init(reason)),
		}
	}

	/// Runs the full workload: every participant issues
	/// `requests_per_node` random lookups.
	pub async fn run_simulation(&self, requests_per_node: u32) -> Result<SimulationStats, SimError> {
		let node_ids = self.node_ids.clone();
		let outcome = self
			.request(Some(SIMULATION_CEILING), |reply| SupervisorMessage::StartSimulation {
				node_ids,
				requests_per_node,
				reply,
			})
			.await?;
		match outcome {
			SimulationResult::Complete { stats } => Ok(stats),
			SimulationResult::Failed { reason } => Err(SimError::Simulation(reason)),
		}
	}

	/// Resolves one ad-hoc lookup for `target` starting at `from_node`.
	pub async fn lookup(&self, target: NodeId, from_node: NodeId) -> Result<LookupResult, SimError> {
		self.request(None, |reply| SupervisorMessage::Lookup { target, from_node, reply }).await
	}

	/// Number of ring participants.
	pub async fn node_count(&self) -> Result<usize, SimError> {
		self.request(None, |reply| SupervisorMessage::GetNodeCount { reply }).await
	}

	/// Terminates the supervisor. Node actors are left to be dropped
	/// with their handles; nothing cascades in the simulation.
	pub async fn shutdown(self) {
		let _ = self.tx.send(SupervisorMessage::Shutdown).await;
	}

	async fn request<T>(
		&self,
		ceiling: Option<Duration>,
		make: impl FnOnce(oneshot::Sender<T>) -> SupervisorMessage,
	) -> Result<T, SimError> {
		let (reply_tx, reply_rx) = oneshot::channel();
		self.tx.send(make(reply_tx)).await.map_err(|_| SimError::ChannelClosed)?;
		match ceiling {
			Some(limit) => match timeout(limit, reply_rx).await {
				Ok(Ok(value)) => Ok(value),
				Ok(Err(_)) => Err(SimError::ChannelClosed),
				Err(_) => Err(SimError::Timeout(limit)),
			},
			None => reply_rx.await.map_err(|_| SimError::ChannelClosed),
		}
	}
}
