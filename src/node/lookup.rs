//! Lookup routing: the recursive find-successor chain and the finger
//! walk behind closest-preceding-finger.

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::ring::{self, NodeId};

use super::message::{FoundSuccessor, NodeMessage};
use super::{Node, NodeHandle, FINGER_QUERY_WAIT, LOOKUP_QUERY_WAIT};

impl Node {
	/// Routes a lookup for `target`.
	///
	/// The classic recursive form: answer with the successor when the
	/// target falls in (self.id, successor.id], otherwise hand the whole
	/// lookup (reply mailbox included) to a closer node and get out of
	/// the way. The chain tail delivers the answer straight to the
	/// original requester.
	pub(super) async fn find_successor(&self, target: NodeId, reply: oneshot::Sender<FoundSuccessor>) {
		// An uninitialized node cannot route; degrade to self-as-successor.
		let Some(successor) = self.successor.clone() else {
			let _ = reply.send(self.found_self());
			return;
		};

		// In a single-node ring every key is ours. Answering here also
		// avoids a node querying its own busy inbox.
		if self.participant_count() == 1 || successor.same_node(&self.self_handle) {
			let _ = reply.send(self.found_self());
			return;
		}

		let successor_id = match successor.id(LOOKUP_QUERY_WAIT).await {
			Ok(id) => id,
			// Best effort is still the successor we hold; its id is
			// recovered from the read-only registry since the owner
			// could not be queried. Only a node with no registry at
			// all falls back to answering with itself.
			Err(err) => {
				debug!(node = self.id, %err, "successor unresponsive, degrading lookup");
				let best_effort = match self.registry_id_of(&successor) {
					Some(id) => FoundSuccessor { id, node: successor },
					None => self.found_self(),
				};
				let _ = reply.send(best_effort);
				return;
			},
		};

		if ring::in_range(target, self.id, successor_id) {
			let _ = reply.send(FoundSuccessor { id: successor_id, node: successor });
			return;
		}

		match successor.closest_preceding_finger(target, LOOKUP_QUERY_WAIT).await {
			Ok(Some(closer)) => {
				trace!(node = self.id, target, "forwarding lookup");
				closer.send(NodeMessage::FindSuccessor { target, reply }).await;
			},
			// No finger of the successor precedes the target, so the
			// target sits just past the successor; let the successor
			// answer with its own successor.
			Ok(None) => {
				successor.send(NodeMessage::FindSuccessor { target, reply }).await;
			},
			// Sub-query failed; best effort is the successor we know of.
			Err(err) => {
				debug!(node = self.id, %err, "closest-preceding-finger query failed");
				let _ = reply.send(FoundSuccessor { id: successor_id, node: successor });
			},
		}
	}

	/// Walks the finger table from the top down and returns the first
	/// entry whose id lies strictly between this node's id and `target`.
	///
	/// Unresponsive fingers are skipped rather than waited out, and
	/// fingers pointing back at this node are skipped outright since
	/// their id can never fall in the exclusive arc. Consecutive indices
	/// often share a node in small rings, so each distinct node is
	/// queried once; the walk stays within the caller's wait even when
	/// a queried node is itself blocked inside a lookup.
	pub(super) async fn closest_preceding_finger(&self, target: NodeId) -> Option<NodeHandle> {
		let mut seen: Vec<&NodeHandle> = Vec::new();
		for finger in self.finger_table.iter().rev() {
			if finger.same_node(&self.self_handle) {
				continue;
			}
			if seen.iter().any(|other| other.same_node(finger)) {
				continue;
			}
			seen.push(finger);
			let finger_id = match finger.id(FINGER_QUERY_WAIT).await {
				Ok(id) => id,
				Err(_) => continue,
			};
			if ring::in_range_exclusive(finger_id, self.id, target) {
				return Some(finger.clone());
			}
		}
		None
	}

	fn found_self(&self) -> FoundSuccessor {
		FoundSuccessor { id: self.id, node: self.self_handle.clone() }
	}

	/// Looks a handle's id up by reference equality against the registry.
	fn registry_id_of(&self, node: &NodeHandle) -> Option<NodeId> {
		let registry = self.registry.as_ref()?;
		registry
			.iter()
			.find(|(_, handle)| handle.same_node(node))
			.map(|(&id, _)| id)
	}
}
