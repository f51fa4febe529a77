//! The random-lookup workload: a reproducible stream of targets routed
//! through the ring, one start node at a time.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::ring::{NodeId, RING_SIZE};

use super::message::SimulationResult;
use super::stats::{estimated_hops, SimulationStats};
use super::{Supervisor, LOOKUP_WAIT};

/// Seed of the workload's target stream. Fixed so a run is reproducible
/// given (node count, requests per node).
const WORKLOAD_SEED: u64 = 12345;

impl Supervisor {
	/// Issues `requests_per_node` lookups from every node in `node_ids`,
	/// in order, and aggregates the outcome.
	///
	/// The PRNG advances by exactly one draw per lookup whether or not
	/// the lookup succeeds, so hop and success totals are reproducible.
	pub(super) async fn run_workload(
		&self,
		node_ids: &[NodeId],
		requests_per_node: u32,
	) -> SimulationResult {
		if node_ids.is_empty() {
			return SimulationResult::Failed { reason: "no participants to run against".into() };
		}

		let mut rng = StdRng::seed_from_u64(WORKLOAD_SEED);
		let total_requests = node_ids.len() as u64 * u64::from(requests_per_node);
		let hops_per_success = estimated_hops(self.node_count);
		let mut successful_lookups = 0;
		let mut total_hops = 0;
		info!(total_requests, "starting workload");
		let started = Instant::now();

		for &from_node in node_ids {
			for _ in 0..requests_per_node {
				let target = rng.gen_range(0..RING_SIZE);
				let Some(start) = self.registry.get(&from_node) else {
					debug!(from_node, "start node missing from registry");
					continue;
				};
				match start.find_successor(target, LOOKUP_WAIT).await {
					Ok(found) => {
						successful_lookups += 1;
						total_hops += hops_per_success;
						debug!(target, found_at = found.id, "lookup resolved");
					},
					Err(err) => {
						debug!(target, from_node, %err, "lookup dropped");
					},
				}
			}
		}

		let stats = SimulationStats {
			node_count: self.node_count,
			total_requests,
			successful_lookups,
			total_hops,
			duration_ms: started.elapsed().as_millis() as u64,
		};
		info!(
			successful = stats.successful_lookups,
			duration_ms = stats.duration_ms,
			"workload finished"
		);
		SimulationResult::Complete { stats }
	}
}
