mod common;

use std::time::Duration;

use chord_sim::node::{self, message::NodeMessage};
use chord_sim::ring;
use chord_sim::supervisor::message::LookupResult;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use common::{id_of, make_ring_nodes, make_supervised_ring, QUERY_WAIT};

#[tokio::test]
async fn nodes_answer_with_their_constructed_id() {
	let (registry, ids) = make_ring_nodes(10).await;
	for &id in &ids {
		assert_eq!(id_of(&registry[&id]).await, id);
	}
}

#[tokio::test]
async fn finger_tables_follow_ring_geometry() {
	let (registry, ids) = make_ring_nodes(10).await;
	for (&id, handle) in registry.iter() {
		for i in 0..ring::M {
			let entry = handle
				.finger_entry(i as usize, QUERY_WAIT)
				.await
				.expect("finger query should resolve")
				.expect("every finger is populated after init");
			let start = ring::finger_start(id, i);
			let expect = ring::find_successor_in_sorted(start, &ids).expect("non-empty ring");
			assert_eq!(id_of(&entry).await, expect, "node {id} finger {i}");
		}

		// the successor is finger zero
		let successor = handle
			.successor(QUERY_WAIT)
			.await
			.expect("successor query should resolve")
			.expect("every node has a successor after init");
		let finger_zero = handle
			.finger_entry(0, QUERY_WAIT)
			.await
			.expect("finger query should resolve")
			.expect("finger zero is populated");
		assert!(successor.same_node(&finger_zero));
	}
}

#[tokio::test]
async fn rebuilding_fingers_on_an_unchanged_registry_is_idempotent() {
	let (registry, ids) = make_ring_nodes(5).await;
	let first = ids[0];
	let handle = &registry[&first];

	let mut before = Vec::new();
	for i in 0..ring::M as usize {
		let entry = handle.finger_entry(i, QUERY_WAIT).await.unwrap().unwrap();
		before.push(id_of(&entry).await);
	}

	let (ack_tx, mut ack_rx) = mpsc::channel(1);
	handle
		.send(NodeMessage::InitFingerTable { registry: registry.clone(), ack: ack_tx })
		.await;
	ack_rx.recv().await.expect("rebuild should ack");

	for (i, &expect) in before.iter().enumerate() {
		let entry = handle.finger_entry(i, QUERY_WAIT).await.unwrap().unwrap();
		assert_eq!(id_of(&entry).await, expect, "finger {i} changed on rebuild");
	}
}

#[tokio::test]
async fn single_node_ring_owns_every_key() {
	let (registry, ids) = make_ring_nodes(1).await;
	let sole = &registry[&ids[0]];
	for target in [0, 1, ids[0], 40000, ring::RING_SIZE - 1] {
		let found = sole
			.find_successor(target, QUERY_WAIT)
			.await
			.expect("lookup should resolve");
		assert_eq!(found.id, ids[0]);
		assert!(found.node.same_node(sole));
	}
}

#[tokio::test]
async fn two_node_ring_splits_the_space() {
	let (registry, ids) = make_ring_nodes(2).await;
	let (lo, hi) = (ids[0], ids[1]);

	for start in [&registry[&lo], &registry[&hi]] {
		// targets in (lo, hi] belong to hi
		for target in [lo + 1, hi / 2, hi] {
			let found = start.find_successor(target, Duration::from_secs(5)).await.unwrap();
			assert_eq!(found.id, hi, "target {target}");
		}
		// targets in (hi, lo] wrap around to lo
		for target in [hi + 1, ring::RING_SIZE - 1, lo] {
			let found = start.find_successor(target, Duration::from_secs(5)).await.unwrap();
			assert_eq!(found.id, lo, "target {target}");
		}
	}
}

#[tokio::test]
async fn target_equal_to_a_participant_resolves_to_it() {
	let (registry, ids) = make_ring_nodes(10).await;
	let start = &registry[&ids[3]];
	for &id in &ids {
		let found = start.find_successor(id, Duration::from_secs(5)).await.unwrap();
		assert_eq!(found.id, id);
	}
}

#[tokio::test]
async fn uninitialized_node_degrades_to_itself() {
	let lone = node::spawn(42);
	let found = lone.find_successor(17, QUERY_WAIT).await.unwrap();
	assert_eq!(found.id, 42);
	assert!(found.node.same_node(&lone));
}

#[tokio::test]
async fn set_successor_is_enough_for_in_range_routing() {
	let a = node::spawn(0);
	let b = node::spawn(100);
	a.send(NodeMessage::SetSuccessor { node: b.clone() }).await;

	let found = a.find_successor(50, QUERY_WAIT).await.unwrap();
	assert_eq!(found.id, 100);
	assert!(found.node.same_node(&b));
}

#[tokio::test]
async fn closest_preceding_finger_walks_from_the_top() {
	// evenly spaced ids for n=10: 0, 6553, 13107, 19660, 26214, ...
	let (registry, ids) = make_ring_nodes(10).await;
	let first = &registry[&ids[0]];

	// nothing lies strictly between 0 and 3000
	let none = first.closest_preceding_finger(3000, Duration::from_secs(5)).await.unwrap();
	assert!(none.is_none());

	// the highest finger below 30000 is the node at 19660
	let closer = first
		.closest_preceding_finger(30000, Duration::from_secs(5))
		.await
		.unwrap()
		.expect("a closer node exists");
	assert_eq!(id_of(&closer).await, 19660);
}

#[tokio::test]
async fn single_node_scenario_runs_all_lookups_in_zero_hops() {
	let supervisor = make_supervised_ring(1).await;
	let stats = supervisor.run_simulation(10).await.expect("workload should run");

	assert_eq!(stats.total_requests, 10);
	assert_eq!(stats.successful_lookups, 10);
	assert_eq!(stats.total_hops, 0);
	assert_eq!(stats.average_hops(), 0.0);
	assert_eq!(stats.theoretical_hops(), 0.0);
	supervisor.shutdown().await;
}

#[tokio::test]
async fn ten_node_scenario_matches_the_estimator() {
	let supervisor = make_supervised_ring(10).await;
	let stats = supervisor.run_simulation(5).await.expect("workload should run");

	assert_eq!(stats.total_requests, 50);
	assert_eq!(stats.successful_lookups, 50);
	assert_eq!(stats.total_hops, 200);
	assert_eq!(stats.average_hops(), 4.0);
	assert!(stats.scales_logarithmically());
	supervisor.shutdown().await;
}

#[tokio::test]
async fn repeated_runs_are_reproducible() {
	let supervisor = make_supervised_ring(10).await;
	let first = supervisor.run_simulation(5).await.expect("workload should run");
	let second = supervisor.run_simulation(5).await.expect("workload should run");

	assert_eq!(first.successful_lookups, second.successful_lookups);
	assert_eq!(first.total_hops, second.total_hops);
	assert_eq!(first.average_hops(), second.average_hops());
	supervisor.shutdown().await;
}

#[tokio::test]
async fn ad_hoc_lookup_reports_the_responsible_node() {
	let supervisor = make_supervised_ring(10).await;
	let ids: Vec<_> = supervisor.node_ids().to_vec();

	match supervisor.lookup(20000, ids[0]).await.expect("supervisor should reply") {
		LookupResult::Success { target, hops, found_at } => {
			assert_eq!(target, 20000);
			assert_eq!(hops, 4);
			assert_eq!(found_at, ring::find_successor_in_sorted(20000, &ids).unwrap());
		},
		LookupResult::Failure { reason } => panic!("lookup failed: {reason}"),
	}

	// a start node outside the registry is a failure value, not a panic
	match supervisor.lookup(20000, 7777).await.expect("supervisor should reply") {
		LookupResult::Failure { reason } => assert!(reason.contains("7777")),
		LookupResult::Success { .. } => panic!("lookup from an unknown node should fail"),
	}
	supervisor.shutdown().await;
}

#[tokio::test]
async fn node_count_is_reported() {
	let supervisor = make_supervised_ring(10).await;
	assert_eq!(supervisor.node_count().await.expect("supervisor should reply"), 10);
	supervisor.shutdown().await;
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(10))]

	#[test]
	fn lookups_agree_with_the_sorted_oracle(n in 2usize..=64, seed in any::<u64>()) {
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_time()
			.build()
			.expect("runtime should build");
		rt.block_on(async move {
			let (registry, ids) = make_ring_nodes(n).await;
			let mut rng = StdRng::seed_from_u64(seed);
			for _ in 0..8 {
				let target = rng.gen_range(0..ring::RING_SIZE);
				let from = ids[rng.gen_range(0..ids.len())];
				let found = registry[&from]
					.find_successor(target, Duration::from_secs(5))
					.await
					.expect("lookup should resolve");
				let expect = ring::find_successor_in_sorted(target, &ids).expect("non-empty ring");
				prop_assert_eq!(found.id, expect, "target {} from {}", target, from);
			}
			Ok(())
		})?;
	}
}
