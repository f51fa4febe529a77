use std::cmp::Ordering;

/// Bit-width of the identifier space.
pub const M: u32 = 16;

/// Size of the identifier space, 2^M. All ids and keys live in [0, RING_SIZE).
pub const RING_SIZE: u64 = 1 << M;

/// A point on the ring. Ids are plain integers; the simulation assigns them
/// up front rather than hashing anything.
pub type NodeId = u64;

/// Tests if `v` is in the clockwise arc (start, end].
///
/// When the arc wraps past zero the test becomes `v > start || v <= end`.
/// The degenerate `start == end` arc never arises from ring routing with
/// distinct ids; it is kept consistent with [`in_range_exclusive`] so that
/// `in_range(v, s, e) == in_range_exclusive(v, s, e) || v == e` holds
/// everywhere.
pub fn in_range(v: NodeId, start: NodeId, end: NodeId) -> bool {
	match start.cmp(&end) {
		Ordering::Less => v > start && v <= end,
		Ordering::Equal => v == end,
		Ordering::Greater => v > start || v <= end,
	}
}

/// Tests if `v` is in the clockwise arc (start, end), both endpoints excluded.
pub fn in_range_exclusive(v: NodeId, start: NodeId, end: NodeId) -> bool {
	match start.cmp(&end) {
		Ordering::Less => v > start && v < end,
		Ordering::Equal => false,
		Ordering::Greater => v > start || v < end,
	}
}

/// Finds the first id >= `target` in an ascending list of participant ids,
/// wrapping back to the smallest id when none is large enough.
///
/// Returns `None` only for an empty list.
pub fn find_successor_in_sorted(target: NodeId, sorted_ids: &[NodeId]) -> Option<NodeId> {
	let at = sorted_ids.partition_point(|&id| id < target);
	sorted_ids.get(at).or_else(|| sorted_ids.first()).copied()
}

/// 2^i. Valid for every finger index, i.e. i < [`M`].
pub fn pow2(i: u32) -> u64 {
	1 << i
}

/// The point the i-th finger of `id` starts from: (id + 2^i) mod RING_SIZE.
pub fn finger_start(id: NodeId, i: u32) -> NodeId {
	(id + pow2(i)) % RING_SIZE
}

/// Evenly spaced participant ids: id_k = floor(k * RING_SIZE / n).
///
/// All ids are distinct as long as n <= RING_SIZE.
pub fn evenly_spaced_ids(n: usize) -> Vec<NodeId> {
	(0..n as u64).map(|k| k * RING_SIZE / n as u64).collect()
}
