#![warn(unreachable_pub, missing_debug_implementations)]

//! The simulation core of a discrete-event network simulator: a priority-queue-driven event
//! loop that moves messages, fragmented into packets, across a graph of nodes and links under
//! bandwidth contention and propagation delay.
//!
//! Build a topology with [`Network::add_node`]/[`Network::join`], call
//! [`Network::initialize_routes`], inject messages directly with [`Network::inject`] or gate them
//! behind a dependency DAG with [`Program`], then drive the simulation with [`Network::run`] or
//! [`Network::run_program`].

#[macro_use]
mod ident;

pub mod constants;
pub mod contention;
pub mod event;
pub mod graph;
pub mod network;
pub mod packet;
pub mod pqueue;
pub mod program;
pub mod routing;

#[cfg(test)]
pub(crate) mod testing;

pub mod units;

pub use contention::{ContentionSink, CsvContentionSink, VecContentionSink};
pub use event::Event;
pub use graph::{Link, LinkId, Node, NodeId, Topology, TopologyError};
pub use network::{Network, NetworkError};
pub use packet::{Completion, Message, MessageId, Packet, PacketSizing};
pub use program::Program;
pub use pqueue::{DedupPriorityQueue, PriorityQueue};
pub use routing::Routes;
