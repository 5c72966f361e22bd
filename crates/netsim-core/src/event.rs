//! The event kinds dispatched by the simulation loop.

use crate::graph::{LinkId, NodeId};
use crate::packet::{Message, Packet};

/// A scheduled future action. Events are tagged data, matched exhaustively by the dispatcher in
/// [`Network::run`](crate::network::Network::run); there is no dynamic dispatch between an event
/// and its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A link finished serializing the head of its queue.
    TxDone(LinkId),
    /// A packet arrived at a node, after serialization and propagation delay.
    Recv(NodeId, Packet),
    /// A message is released into the graph.
    InjectMessage(Message),
}
