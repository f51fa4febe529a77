#![deny(missing_docs)]

//! A single-process, multi-actor simulation of the Chord distributed
//! hash table, built to measure lookup path lengths against the
//! log2(N) baseline.
//!
//! Every ring participant is one tokio task draining a message inbox;
//! a supervisor task creates the ring, broadcasts finger-table
//! initialization, then routes a reproducible stream of random lookups
//! through it and aggregates the results.
//!
//! # Examples
//! Build a 64-node ring and run ten lookups per node.
//! ```no_run
//! # use chord_sim::Supervisor;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let supervisor = Supervisor::spawn(64);
//! supervisor.initialize().await.expect("ring should initialize");
//!
//! let stats = supervisor.run_simulation(10).await.expect("workload should run");
//! println!("average hops: {:.2}", stats.average_hops());
//! println!("log2 baseline: {:.2}", stats.theoretical_hops());
//!
//! supervisor.shutdown().await;
//! # }
//! ```

/// Pure arithmetic over the cyclic identifier space.
pub mod ring;

/// The per-participant node actor and its handle.
pub mod node;

/// The orchestrating supervisor actor, workload driver and statistics.
pub mod supervisor;

mod error;

pub use error::SimError;
pub use node::NodeHandle;
pub use ring::NodeId;
pub use supervisor::{SimulationStats, Supervisor, SupervisorHandle};
