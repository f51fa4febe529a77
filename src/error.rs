use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by handle-level queries against the actors.
///
/// Nothing in the simulation panics across an actor boundary; a query
/// either produces its reply or one of these.
#[derive(Debug, Error)]
pub enum SimError {
	/// The queried actor did not reply within the bounded wait.
	#[error("no reply within {0:?}")]
	Timeout(Duration),

	/// The queried actor is gone and its mailbox is closed.
	#[error("actor mailbox closed")]
	ChannelClosed,

	/// The init barrier reported a failure.
	#[error("initialization failed: {0}")]
	Init(String),

	/// The workload reported a failure.
	#[error("simulation failed: {0}")]
	Simulation(String),
}
