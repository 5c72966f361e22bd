//! Utilities for writing tests.

use crate::graph::{NodeId, Topology};
use crate::units::{BitsPerSec, Seconds};

/// Generate a topology with two hosts (IDs 0, 1) connected through a switch (ID 2).
///
/// Links are symmetric, `1024 bps` with a `0.1s` propagation delay.
pub fn three_node_topology() -> Topology {
    let mut topo = Topology::new();
    let h0 = topo.add_node();
    let h1 = topo.add_node();
    let sw = topo.add_node();
    topo.join_symmetric(h0, sw, BitsPerSec::new(1024.0), Seconds::new(0.1))
        .unwrap();
    topo.join_symmetric(h1, sw, BitsPerSec::new(1024.0), Seconds::new(0.1))
        .unwrap();
    topo
}

/// Generate a topology with four hosts (IDs 0-3), two ToR switches (IDs 4-5), and two aggregation
/// switches (IDs 6-7) organized in a Clos topology. Each ToR is connected to two hosts and to
/// both aggregation switches.
///
/// Links are symmetric, `1024 bps` with a `0` propagation delay.
pub fn clos_topology() -> Topology {
    let mut topo = Topology::new();
    let hosts: Vec<_> = (0..4).map(|_| topo.add_node()).collect();
    let tors: Vec<_> = (0..2).map(|_| topo.add_node()).collect();
    let aggs: Vec<_> = (0..2).map(|_| topo.add_node()).collect();

    let bw = BitsPerSec::new(1024.0);
    let delay = Seconds::ZERO;
    topo.join_symmetric(hosts[0], tors[0], bw, delay).unwrap();
    topo.join_symmetric(hosts[1], tors[0], bw, delay).unwrap();
    topo.join_symmetric(hosts[2], tors[1], bw, delay).unwrap();
    topo.join_symmetric(hosts[3], tors[1], bw, delay).unwrap();
    topo.join_symmetric(tors[0], aggs[0], bw, delay).unwrap();
    topo.join_symmetric(tors[0], aggs[1], bw, delay).unwrap();
    topo.join_symmetric(tors[1], aggs[0], bw, delay).unwrap();
    topo.join_symmetric(tors[1], aggs[1], bw, delay).unwrap();
    topo
}

/// Generate the small fan-out topology used by the parallel-non-interference scenario: a host
/// connected through a switch to two other hosts, returned as `(topology, [src, switch, dst_a,
/// dst_b])`.
///
/// Links are symmetric, `1024 bps` with a `0` propagation delay, matching the bandwidth used in
/// scenario S3.
pub fn fanout_topology() -> (Topology, [NodeId; 4]) {
    let mut topo = Topology::new();
    let h0 = topo.add_node();
    let sw = topo.add_node();
    let h2 = topo.add_node();
    let h3 = topo.add_node();
    let bw = BitsPerSec::new(1024.0);
    let delay = Seconds::ZERO;
    topo.join_symmetric(h0, sw, bw, delay).unwrap();
    topo.join_symmetric(sw, h2, bw, delay).unwrap();
    topo.join_symmetric(sw, h3, bw, delay).unwrap();
    (topo, [h0, sw, h2, h3])
}
