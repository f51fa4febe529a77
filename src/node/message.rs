use tokio::sync::{mpsc, oneshot};

use crate::ring::NodeId;

use super::{NodeHandle, Registry};

/// Everything a node actor can be asked to do.
///
/// Reply-carrying variants hold the requester's one-shot mailbox; the
/// lookup reply in particular may be forwarded along the ring and
/// answered by a node other than the one originally asked.
#[derive(Debug)]
pub enum NodeMessage {
	/// Reply with this node's id.
	GetId {
		/// Where to deliver the id.
		reply: oneshot::Sender<NodeId>,
	},
	/// Reply with the current successor, if any.
	GetSuccessor {
		/// Where to deliver the successor handle.
		reply: oneshot::Sender<Option<NodeHandle>>,
	},
	/// Overwrite the successor.
	SetSuccessor {
		/// The new successor.
		node: NodeHandle,
	},
	/// Overwrite the predecessor.
	SetPredecessor {
		/// The new predecessor.
		node: NodeHandle,
	},
	/// Build the finger table against the full participant registry,
	/// then acknowledge on the shared init mailbox.
	InitFingerTable {
		/// Id-to-handle map of every ring participant.
		registry: Registry,
		/// Shared mailbox the supervisor counts acks on.
		ack: mpsc::Sender<InitializationComplete>,
	},
	/// Reply with the finger at the given index, if populated.
	GetFingerEntry {
		/// Finger index in [0, M).
		index: usize,
		/// Where to deliver the entry.
		reply: oneshot::Sender<Option<NodeHandle>>,
	},
	/// Route a lookup for `target`; the final answer goes straight to
	/// `reply` from whichever node resolves it.
	FindSuccessor {
		/// The key being looked up.
		target: NodeId,
		/// The original requester's one-shot mailbox.
		reply: oneshot::Sender<FoundSuccessor>,
	},
	/// Reply with the highest-index finger strictly between this node's
	/// id and `target`, or `None` when no finger is closer.
	ClosestPrecedingFinger {
		/// The key being looked up.
		target: NodeId,
		/// Where to deliver the finger.
		reply: oneshot::Sender<Option<NodeHandle>>,
	},
}

/// Ack a node sends once its finger table is built and its successor set.
#[derive(Debug, Clone, Copy)]
pub struct InitializationComplete {
	/// Id of the node that finished initializing.
	pub id: NodeId,
}

/// Final answer to a lookup: the participant responsible for the target.
#[derive(Debug, Clone)]
pub struct FoundSuccessor {
	/// Id of the responsible node.
	pub id: NodeId,
	/// Handle of the responsible node.
	pub node: NodeHandle,
}
