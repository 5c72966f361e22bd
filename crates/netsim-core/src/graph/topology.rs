//! Graph construction and validation.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::graph::types::{Link, LinkId, Node, NodeId};
use crate::units::{BitsPerSec, Seconds};

/// Errors raised while building or mutating a [`Topology`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopologyError {
    /// `join` referenced a node handle that was never returned by `add_node`.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    /// `join` was asked to connect a node to itself.
    #[error("self-adjacent link: {0}")]
    SelfLoop(NodeId),
}

/// A graph of [`Node`]s and [`Link`]s.
///
/// Nodes and links live in arenas (`Vec<Node>`, `Vec<Link>`) addressed by stable [`NodeId`]/
/// [`LinkId`] handles, sidestepping the cyclic-reference problem of nodes pointing at links that
/// point back at nodes. A [`petgraph::graph::DiGraph`] mirrors the same structure purely for
/// connectivity queries (BFS); it carries `NodeId`/`LinkId` as node/edge weights rather than the
/// arena values themselves, so the two representations can't drift apart silently -- a missing
/// arena entry would show up as a panicking index lookup, not a stale graph payload.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
    graph: DiGraph<NodeId, LinkId>,
    node_index: FxHashMap<NodeId, NodeIndex>,
    /// `src -> [(dst, link), ...]` in insertion order. BFS traversal must preserve this order for
    /// reproducibility, which petgraph's own neighbor iteration order does not guarantee to be
    /// stable across edge insertions and removals.
    adjacency: FxHashMap<NodeId, Vec<(NodeId, LinkId)>>,
    /// `(src, dst) -> link`, used so that re-`join`ing a pair replaces rather than duplicates.
    edge_of: FxHashMap<(NodeId, NodeId), LinkId>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            graph: DiGraph::new(),
            node_index: FxHashMap::default(),
            adjacency: FxHashMap::default(),
            edge_of: FxHashMap::default(),
        }
    }

    /// Adds a new node and returns its handle.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(id));
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
        self.adjacency.insert(id, Vec::new());
        id
    }

    fn check_node(&self, id: NodeId) -> Result<(), TopologyError> {
        if self.node_index.contains_key(&id) {
            Ok(())
        } else {
            Err(TopologyError::UnknownNode(id))
        }
    }

    /// Installs a directed link `src -> dst`. Re-joining an existing `(src, dst)` pair replaces
    /// the previous link rather than adding a second one.
    pub fn join(
        &mut self,
        src: NodeId,
        dst: NodeId,
        bandwidth: BitsPerSec,
        delay: Seconds,
    ) -> Result<LinkId, TopologyError> {
        self.check_node(src)?;
        self.check_node(dst)?;
        if src == dst {
            return Err(TopologyError::SelfLoop(src));
        }
        if let Some(&existing) = self.edge_of.get(&(src, dst)) {
            let link = Link::new(existing, src, dst, bandwidth, delay);
            self.links[existing.inner()] = link;
            return Ok(existing);
        }
        let id = LinkId::new(self.links.len());
        let link = Link::new(id, src, dst, bandwidth, delay);
        self.links.push(link);
        self.edge_of.insert((src, dst), id);
        self.graph
            .add_edge(self.node_index[&src], self.node_index[&dst], id);
        self.adjacency.get_mut(&src).expect("src was just validated").push((dst, id));
        Ok(id)
    }

    /// Installs two independent directed links `a -> b` and `b -> a` with the same bandwidth and
    /// delay.
    pub fn join_symmetric(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: BitsPerSec,
        delay: Seconds,
    ) -> Result<(LinkId, LinkId), TopologyError> {
        let ab = self.join(a, b, bandwidth, delay)?;
        let ba = self.join(b, a, bandwidth, delay)?;
        Ok((ab, ba))
    }

    /// All node handles, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All link handles, in creation order (stable: `links()[id.inner()].id == id`).
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The link state for `id`.
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.inner()]
    }

    /// Outgoing neighbors of `node`, in the order their links were installed.
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, LinkId)] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The number of links in the topology.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_rejects_unknown_node() {
        let mut topo = Topology::new();
        let a = topo.add_node();
        let ghost = NodeId::new(99);
        assert_eq!(
            topo.join(a, ghost, BitsPerSec::new(1.0), Seconds::ZERO),
            Err(TopologyError::UnknownNode(ghost))
        );
    }

    #[test]
    fn join_rejects_self_loop() {
        let mut topo = Topology::new();
        let a = topo.add_node();
        assert_eq!(
            topo.join(a, a, BitsPerSec::new(1.0), Seconds::ZERO),
            Err(TopologyError::SelfLoop(a))
        );
    }

    #[test]
    fn rejoining_replaces_not_duplicates() {
        let mut topo = Topology::new();
        let a = topo.add_node();
        let b = topo.add_node();
        topo.join(a, b, BitsPerSec::new(1.0), Seconds::ZERO).unwrap();
        assert_eq!(topo.link_count(), 1);
        topo.join(a, b, BitsPerSec::new(2.0), Seconds::new(5.0)).unwrap();
        assert_eq!(topo.link_count(), 1);
        assert_eq!(topo.neighbors(a).len(), 1);
        let (_, link_id) = topo.neighbors(a)[0];
        assert_eq!(topo.link(link_id).bandwidth, BitsPerSec::new(2.0));
    }

    #[test]
    fn neighbors_preserve_insertion_order() {
        let mut topo = Topology::new();
        let a = topo.add_node();
        let b = topo.add_node();
        let c = topo.add_node();
        let d = topo.add_node();
        topo.join(a, d, BitsPerSec::new(1.0), Seconds::ZERO).unwrap();
        topo.join(a, c, BitsPerSec::new(1.0), Seconds::ZERO).unwrap();
        topo.join(a, b, BitsPerSec::new(1.0), Seconds::ZERO).unwrap();
        let order: Vec<NodeId> = topo.neighbors(a).iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec![d, c, b]);
    }
}
