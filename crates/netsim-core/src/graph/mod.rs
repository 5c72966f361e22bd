//! The network graph: nodes, directed links, and topology construction.

pub mod topology;
pub mod types;

pub use topology::{Topology, TopologyError};
pub use types::{Link, LinkId, Node, NodeId};
