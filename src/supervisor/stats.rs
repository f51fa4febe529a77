use serde::Serialize;

use crate::ring;

/// Hop count attributed to one successful lookup: the ceiling of
/// log2(node_count), clamped to the identifier bit-width.
///
/// The routing chain does not thread a live counter, so reported hops
/// are this theoretical-bound estimate rather than a measurement.
pub(crate) fn estimated_hops(node_count: usize) -> u64 {
	let mut hops = 0;
	while (1usize << hops) < node_count && hops < ring::M as u64 {
		hops += 1;
	}
	hops
}

/// Aggregate result of one workload run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
	/// Ring size the workload ran against.
	pub node_count: usize,
	/// Lookups issued: node_count times requests-per-node.
	pub total_requests: u64,
	/// Lookups that resolved within their window.
	pub successful_lookups: u64,
	/// Sum of per-lookup hop counts over the successful lookups.
	pub total_hops: u64,
	/// Wall-clock duration of the workload, monotonic milliseconds.
	pub duration_ms: u64,
}

impl SimulationStats {
	/// Mean hops per successful lookup; 0 when nothing succeeded.
	pub fn average_hops(&self) -> f64 {
		if self.successful_lookups == 0 {
			0.0
		} else {
			self.total_hops as f64 / self.successful_lookups as f64
		}
	}

	/// The log2(N) baseline the averages are judged against.
	pub fn theoretical_hops(&self) -> f64 {
		(self.node_count as f64).log2()
	}

	/// True when the measured average stays within 1.5x the baseline.
	pub fn scales_logarithmically(&self) -> bool {
		self.average_hops() <= 1.5 * self.theoretical_hops()
	}
}
