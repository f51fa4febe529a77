//! The node actor: one concurrent task per ring participant.
//!
//! A node owns its Chord state (id, successor, predecessor, finger table
//! and the read-only participant registry) and processes the messages in
//! [`message::NodeMessage`] sequentially, in arrival order. All state is
//! private to the actor task; the rest of the system only ever holds a
//! [`NodeHandle`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::debug;

use crate::error::SimError;
use crate::ring::{self, NodeId};

/// Messages a node actor understands, and their reply payloads.
pub mod message;
mod lookup;

use message::{InitializationComplete, NodeMessage};

/// Read-only id-to-handle map of every ring participant, handed to each
/// node at init time in place of a live join protocol.
pub type Registry = Arc<BTreeMap<NodeId, NodeHandle>>;

/// Bounded wait for id queries during a finger-table walk.
pub(crate) const FINGER_QUERY_WAIT: Duration = Duration::from_millis(100);

/// Bounded wait for sub-queries made while routing a lookup.
pub(crate) const LOOKUP_QUERY_WAIT: Duration = Duration::from_secs(1);

/// A send-only reference to a node actor's inbox.
///
/// Handles carry no id; a node's id must be queried by message. Two
/// handles are the same node exactly when they point at the same inbox.
#[derive(Debug, Clone)]
pub struct NodeHandle {
	tx: mpsc::Sender<NodeMessage>,
}

impl NodeHandle {
	/// Tests whether `other` refers to the same actor as `self`.
	pub fn same_node(&self, other: &NodeHandle) -> bool {
		self.tx.same_channel(&other.tx)
	}

	/// Delivers a raw message, silently dropping it if the actor is gone.
	pub async fn send(&self, msg: NodeMessage) {
		let _ = self.tx.send(msg).await;
	}

	/// Queries the node's id, waiting at most `wait` for the reply.
	pub async fn id(&self, wait: Duration) -> Result<NodeId, SimError> {
		self.request(wait, |reply| NodeMessage::GetId { reply }).await
	}

	/// Queries the node's successor.
	pub async fn successor(&self, wait: Duration) -> Result<Option<NodeHandle>, SimError> {
		self.request(wait, |reply| NodeMessage::GetSuccessor { reply }).await
	}

	/// Queries the finger-table entry at `index`.
	pub async fn finger_entry(&self, index: usize, wait: Duration) -> Result<Option<NodeHandle>, SimError> {
		self.request(wait, |reply| NodeMessage::GetFingerEntry { index, reply }).await
	}

	/// Asks the node for its closest finger preceding `target`.
	pub async fn closest_preceding_finger(
		&self,
		target: NodeId,
		wait: Duration,
	) -> Result<Option<NodeHandle>, SimError> {
		self.request(wait, |reply| NodeMessage::ClosestPrecedingFinger { target, reply }).await
	}

	/// Starts a lookup for `target` at this node and waits for the answer,
	/// wherever along the ring it ends up being produced.
	pub async fn find_successor(
		&self,
		target: NodeId,
		wait: Duration,
	) -> Result<message::FoundSuccessor, SimError> {
		self.request(wait, |reply| NodeMessage::FindSuccessor { target, reply }).await
	}

	async fn request<T>(
		&self,
		wait: Duration,
		make: impl FnOnce(oneshot::Sender<T>) -> NodeMessage,
	) -> Result<T, SimError> {
		let (reply_tx, reply_rx) = oneshot::channel();
		self.tx.send(make(reply_tx)).await.map_err(|_| SimError::ChannelClosed)?;
		match timeout(wait, reply_rx).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(_)) => Err(SimError::ChannelClosed),
			Err(_) => Err(SimError::Timeout(wait)),
		}
	}
}

/// State owned exclusively by a node's actor task.
pub(crate) struct Node {
	id: NodeId,
	successor: Option<NodeHandle>,
	predecessor: Option<NodeHandle>,
	finger_table: Vec<NodeHandle>,
	registry: Option<Registry>,
	self_handle: NodeHandle,
}

/// Spawns a node actor with the given id and returns its handle.
///
/// The node starts out uninitialized: it answers state queries but
/// degrades routing requests to itself-as-successor until it receives
/// `InitFingerTable`.
pub fn spawn(id: NodeId) -> NodeHandle {
	let (tx, rx) = mpsc::channel(50);
	let handle = NodeHandle { tx };
	let node = Node {
		id,
		successor: None,
		predecessor: None,
		finger_table: Vec::new(),
		registry: None,
		self_handle: handle.clone(),
	};
	tokio::spawn(node.run(rx));
	handle
}

impl Node {
	async fn run(mut self, mut inbox: mpsc::Receiver<NodeMessage>) {
		while let Some(msg) = inbox.recv().await {
			self.process(msg).await;
		}
		debug!(node = self.id, "node actor terminating");
	}

	async fn process(&mut self, msg: NodeMessage) {
		match msg {
			NodeMessage::GetId { reply } => {
				let _ = reply.send(self.id);
			},
			NodeMessage::GetSuccessor { reply } => {
				let _ = reply.send(self.successor.clone());
			},
			NodeMessage::SetSuccessor { node } => {
				self.successor = Some(node);
			},
			NodeMessage::SetPredecessor { node } => {
				let replaced = self.predecessor.replace(node).is_some();
				debug!(node = self.id, replaced, "predecessor updated");
			},
			NodeMessage::InitFingerTable { registry, ack } => {
				self.init_finger_table(registry, ack).await;
			},
			NodeMessage::GetFingerEntry { index, reply } => {
				let _ = reply.send(self.finger_table.get(index).cloned());
			},
			NodeMessage::FindSuccessor { target, reply } => {
				self.find_successor(target, reply).await;
			},
			NodeMessage::ClosestPrecedingFinger { target, reply } => {
				let finger = self.closest_preceding_finger(target).await;
				let _ = reply.send(finger);
			},
		}
	}

	/// Builds the finger table purely against the supplied registry.
	///
	/// Entry i is the registry node owning (self.id + 2^i) mod RING_SIZE;
	/// the successor is entry 0. Rebuilding against an unchanged registry
	/// is idempotent. Acks on the shared init mailbox when done.
	async fn init_finger_table(&mut self, registry: Registry, ack: mpsc::Sender<InitializationComplete>) {
		let sorted_ids: Vec<NodeId> = registry.keys().copied().collect();
		let mut fingers = Vec::with_capacity(ring::M as usize);
		for i in 0..ring::M {
			let start = ring::finger_start(self.id, i);
			let owner = ring::find_successor_in_sorted(start, &sorted_ids)
				.and_then(|id| registry.get(&id));
			match owner {
				Some(node) => fingers.push(node.clone()),
				// unreachable with a non-empty registry; leave the table
				// truncated rather than point a finger at nothing
				None => break,
			}
		}
		self.successor = fingers.first().cloned();
		self.finger_table = fingers;
		self.registry = Some(registry);
		debug!(node = self.id, fingers = self.finger_table.len(), "finger table built");
		let _ = ack.send(InitializationComplete { id: self.id }).await;
	}

	fn participant_count(&self) -> usize {
		self.registry.as_ref().map_or(0, |r| r.len())
	}
}
