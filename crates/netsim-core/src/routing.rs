//! BFS shortest-path routing.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{LinkId, NodeId, Topology};

/// A route table mapping `(src, dst) -> next-hop link`, built by a single BFS per node.
///
/// Ties are broken by the insertion order of each node's neighbors (see
/// [`Topology::neighbors`]), which is why routing is computed directly over `Topology`'s
/// adjacency lists rather than petgraph's neighbor iterator -- the latter's ordering is an
/// implementation detail, not a documented contract.
#[derive(Debug, Clone, Default)]
pub struct Routes {
    table: FxHashMap<NodeId, FxHashMap<NodeId, LinkId>>,
}

impl Routes {
    /// Computes shortest-path routes for every node in `topology`.
    pub fn build(topology: &Topology) -> Self {
        let table = topology
            .nodes()
            .iter()
            .map(|node| (node.id, bfs_first_hops(topology, node.id)))
            .collect();
        Self { table }
    }

    /// The next-hop link to forward a packet from `src` towards `dst`, or `None` if no path
    /// exists.
    pub fn next_hop(&self, src: NodeId, dst: NodeId) -> Option<LinkId> {
        self.table.get(&src).and_then(|hops| hops.get(&dst)).copied()
    }
}

/// Breadth-first search from `src`, recording for every reachable node the link leaving `src`
/// on the first (and therefore shortest) discovered path to it.
fn bfs_first_hops(topology: &Topology, src: NodeId) -> FxHashMap<NodeId, LinkId> {
    let mut first_hop = FxHashMap::default();
    let mut visited = FxHashSet::default();
    visited.insert(src);

    let mut queue = VecDeque::new();
    queue.push_back(src);

    while let Some(u) = queue.pop_front() {
        for &(v, link) in topology.neighbors(u) {
            if visited.insert(v) {
                let hop_out_of_src = if u == src { link } else { first_hop[&u] };
                first_hop.insert(v, hop_out_of_src);
                queue.push_back(v);
            }
        }
    }
    first_hop
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::testing;
    use crate::units::{BitsPerSec, Seconds};

    /// A stable, sorted rendering of the route table for snapshotting.
    fn sorted_routes(routes: &Routes) -> BTreeMap<NodeId, BTreeMap<NodeId, LinkId>> {
        routes
            .table
            .iter()
            .map(|(src, hops)| (*src, hops.iter().map(|(d, l)| (*d, *l)).collect()))
            .collect()
    }

    #[test]
    fn route_three_node_works() {
        let topo = testing::three_node_topology();
        let routes = Routes::build(&topo);
        insta::assert_yaml_snapshot!(sorted_routes(&routes), @r###"
        0:
          1: 0
          2: 0
        1:
          0: 2
          2: 2
        2:
          0: 1
          1: 3
        "###);
    }

    #[test]
    fn route_eight_node_clos_works() {
        let topo = testing::clos_topology();
        let routes = Routes::build(&topo);
        // Host 0 reaches host 2 through its local ToR (node 4) then the other ToR (node 5).
        let first = routes.next_hop(NodeId::new(0), NodeId::new(2));
        assert!(first.is_some());
    }

    #[test]
    fn fanout_destinations_use_distinct_downstream_links() {
        let (topo, [h0, sw, h2, h3]) = testing::fanout_topology();
        let routes = Routes::build(&topo);
        let to_h2 = routes.next_hop(h0, h2).unwrap();
        let to_h3 = routes.next_hop(h0, h3).unwrap();
        // Both routes leave h0 via the switch's shared uplink...
        assert_eq!(to_h2, routes.next_hop(h0, sw).unwrap());
        assert_eq!(to_h3, routes.next_hop(h0, sw).unwrap());
        // ...but the switch itself forwards onward over disjoint links.
        assert_ne!(routes.next_hop(sw, h2).unwrap(), routes.next_hop(sw, h3).unwrap());
    }

    #[test]
    fn unreachable_destination_has_no_route() {
        let mut topo = Topology::new();
        let a = topo.add_node();
        let b = topo.add_node();
        topo.join(a, b, BitsPerSec::new(1.0), Seconds::ZERO).unwrap();
        let routes = Routes::build(&topo);
        assert_eq!(routes.next_hop(b, a), None);
    }
}
