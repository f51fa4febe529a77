use std::env;
use std::process::ExitCode;

use chord_sim::{ring, SimulationStats, Supervisor};

fn usage(program: &str) -> ExitCode {
	println!("Usage: {program} <num_nodes> <num_requests>");
	ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_max_level(tracing::Level::WARN)
		.init();

	let args: Vec<String> = env::args().collect();
	let program = args.first().map(String::as_str).unwrap_or("chord_sim");
	if args.len() != 3 {
		return usage(program);
	}
	let (Ok(num_nodes), Ok(num_requests)) = (args[1].parse::<usize>(), args[2].parse::<u32>()) else {
		return usage(program);
	};
	if num_nodes == 0 || num_requests == 0 {
		println!("num_nodes and num_requests must be positive integers");
		return ExitCode::FAILURE;
	}
	if num_nodes as u64 > ring::RING_SIZE {
		println!("num_nodes must be at most {} for distinct ids", ring::RING_SIZE);
		return ExitCode::FAILURE;
	}

	println!("Simulating a Chord ring of {num_nodes} nodes, {num_requests} requests per node");

	let supervisor = Supervisor::spawn(num_nodes);
	if let Err(err) = supervisor.initialize().await {
		println!("Ring initialization failed: {err}");
		supervisor.shutdown().await;
		return ExitCode::SUCCESS;
	}

	match supervisor.run_simulation(num_requests).await {
		Ok(stats) => print_report(&stats),
		Err(err) => println!("Simulation failed: {err}"),
	}

	supervisor.shutdown().await;
	ExitCode::SUCCESS
}

fn print_report(stats: &SimulationStats) {
	println!("Total requests: {}", stats.total_requests);
	println!("Successful lookups: {}", stats.successful_lookups);
	println!("Total time: {} ms", stats.duration_ms);
	println!("Average hops: {:.2}", stats.average_hops());
	println!("Theoretical hops (log2 N): {:.2}", stats.theoretical_hops());
	if stats.scales_logarithmically() {
		println!("Routing scales logarithmically with network size");
	} else {
		println!("Routing may not be optimal for this network size");
	}
}
