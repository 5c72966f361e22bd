//! Builds a small Clos topology directly against the public API and runs a handful of
//! cross-rack messages through it, printing each one's completion time.

use clap::Parser;
use netsim::units::{BitsPerSec, Bytes, Seconds};
use netsim::{Message, Network, Program};

/// Realistic bandwidth/delay for a single demo run; override to see contention shift completion
/// times around.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Link bandwidth, in bits per second
    #[arg(long, default_value_t = 10_000_000_000.0)]
    bandwidth_bps: f64,

    /// Per-link propagation delay, in seconds
    #[arg(long, default_value_t = 0.000_001)]
    delay_s: f64,

    /// Message size, in bytes, for each of the demo's cross-rack messages
    #[arg(long, default_value_t = 1_000_000)]
    message_bytes: u64,
}

/// Four hosts (0-3), two ToR switches (4-5), and two aggregation switches (6-7). Each ToR
/// connects to two hosts and to both aggregation switches.
fn build_clos(bandwidth: BitsPerSec, delay: Seconds) -> anyhow::Result<(Network, Vec<netsim::NodeId>)> {
    let mut network = Network::new();
    let hosts: Vec<_> = (0..4).map(|_| network.add_node()).collect();
    let tors: Vec<_> = (0..2).map(|_| network.add_node()).collect();
    let aggs: Vec<_> = (0..2).map(|_| network.add_node()).collect();

    network.join_symmetric(hosts[0], tors[0], bandwidth, delay)?;
    network.join_symmetric(hosts[1], tors[0], bandwidth, delay)?;
    network.join_symmetric(hosts[2], tors[1], bandwidth, delay)?;
    network.join_symmetric(hosts[3], tors[1], bandwidth, delay)?;
    network.join_symmetric(tors[0], aggs[0], bandwidth, delay)?;
    network.join_symmetric(tors[0], aggs[1], bandwidth, delay)?;
    network.join_symmetric(tors[1], aggs[0], bandwidth, delay)?;
    network.join_symmetric(tors[1], aggs[1], bandwidth, delay)?;
    network.initialize_routes();

    Ok((network, hosts))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bandwidth = BitsPerSec::new(args.bandwidth_bps);
    let delay = Seconds::new(args.delay_s);
    let (mut network, hosts) = build_clos(bandwidth, delay)?;

    let size = Bytes::new(args.message_bytes);
    let mut program = Program::new();
    let names = [
        ("h0-to-h2", hosts[0], hosts[2]),
        ("h1-to-h3", hosts[1], hosts[3]),
        ("h0-to-h3", hosts[0], hosts[3]),
    ];
    let ids: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, (name, src, dst))| {
            let id = program.add(Message::new(netsim::MessageId::new(i), *src, *dst, size), []);
            (*name, id)
        })
        .collect();

    let final_time = network.run_program(program)?;
    println!("simulation finished at {final_time}");
    for (name, id) in &ids {
        println!("{name}: {}", network.completion_time(*id).unwrap());
    }

    Ok(())
}
