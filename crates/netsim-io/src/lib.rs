//! Loading topologies and message programs from JSON or Dhall spec files.
//!
//! Topologies and programs are ordinarily built directly against `netsim_core`'s API, as in its
//! own test fixtures, but this crate lets them be described declaratively instead, mirroring how
//! the simulation core's upstream sibling loads its own topology specs.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use netsim_core::graph::NodeId;
use netsim_core::packet::{Message, MessageId};
use netsim_core::program::Program;
use netsim_core::units::{BitsPerSec, Bytes, Seconds};
use netsim_core::{Network, NetworkError};

/// A topology specification: a node count and the links joining them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TopologySpec {
    /// The number of nodes in the topology, numbered `0..node_count`.
    pub node_count: usize,
    /// The links joining those nodes.
    pub links: Vec<LinkSpec>,
}

/// One link (or, if `symmetric`, a pair of links) in a [`TopologySpec`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinkSpec {
    /// Index of the source node.
    pub src: usize,
    /// Index of the destination node.
    pub dst: usize,
    /// Bandwidth, in bits per simulated second.
    pub bandwidth_bps: f64,
    /// Propagation delay, in simulated seconds.
    pub delay_s: f64,
    /// If true, install an independent link in both directions instead of just `src -> dst`.
    #[serde(default)]
    pub symmetric: bool,
}

impl TopologySpec {
    /// Builds a [`Network`] from this spec and computes its routes. Returns the network along
    /// with each node's handle in spec order, for resolving a [`ProgramSpec`]'s node indices.
    pub fn build(&self) -> Result<(Network, Vec<NodeId>), ConfigError> {
        let mut network = Network::new();
        let nodes: Vec<NodeId> = (0..self.node_count).map(|_| network.add_node()).collect();
        for link in &self.links {
            let src = *nodes.get(link.src).ok_or(ConfigError::UnknownNodeIndex(link.src))?;
            let dst = *nodes.get(link.dst).ok_or(ConfigError::UnknownNodeIndex(link.dst))?;
            let bandwidth = BitsPerSec::new(link.bandwidth_bps);
            let delay = Seconds::new(link.delay_s);
            if link.symmetric {
                network.join_symmetric(src, dst, bandwidth, delay)?;
            } else {
                network.join(src, dst, bandwidth, delay)?;
            }
        }
        network.initialize_routes();
        Ok((network, nodes))
    }
}

/// A program specification: named messages, each gated on any number of prior messages by name.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProgramSpec {
    /// The messages to release into the network, in no particular order.
    pub messages: Vec<MessageSpec>,
}

/// One message in a [`ProgramSpec`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageSpec {
    /// A name unique within this spec, used to express dependencies and report completion times.
    pub name: String,
    /// Index of the source node.
    pub src: usize,
    /// Index of the destination node.
    pub dst: usize,
    /// Message size, in bytes.
    pub count_bytes: u64,
    /// Names of messages that must complete delivery before this one is released.
    #[serde(default)]
    pub after: Vec<String>,
    /// Additional delay, in simulated seconds, applied after every prerequisite completes.
    #[serde(default)]
    pub delay_s: f64,
}

impl ProgramSpec {
    /// Builds a [`Program`] from this spec, resolving node indices against `nodes` (as returned
    /// by [`TopologySpec::build`]). Returns the program along with each message's name and
    /// assigned ID, in spec order, for reporting completion times by name.
    pub fn build(&self, nodes: &[NodeId]) -> Result<(Program, Vec<(String, MessageId)>), ConfigError> {
        let ids_by_name: FxHashMap<&str, MessageId> = self
            .messages
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name.as_str(), MessageId::new(i)))
            .collect();

        let mut program = Program::new();
        let mut named_ids = Vec::with_capacity(self.messages.len());
        for (i, spec) in self.messages.iter().enumerate() {
            let id = MessageId::new(i);
            let src = *nodes.get(spec.src).ok_or(ConfigError::UnknownNodeIndex(spec.src))?;
            let dst = *nodes.get(spec.dst).ok_or(ConfigError::UnknownNodeIndex(spec.dst))?;
            let message = Message::new(id, src, dst, Bytes::new(spec.count_bytes));
            let after = spec
                .after
                .iter()
                .map(|name| {
                    ids_by_name
                        .get(name.as_str())
                        .copied()
                        .ok_or_else(|| ConfigError::UnknownMessageName(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            program.add_with_delay(message, after, Seconds::new(spec.delay_s));
            named_ids.push((spec.name.clone(), id));
        }
        Ok((program, named_ids))
    }
}

/// Reads a [`TopologySpec`] from a file, dispatching on its extension (`.json` or `.dhall`).
pub fn read_topology_spec(path: impl AsRef<Path>) -> Result<TopologySpec, ConfigError> {
    read_spec(path)
}

/// Reads a [`ProgramSpec`] from a file, dispatching on its extension (`.json` or `.dhall`).
pub fn read_program_spec(path: impl AsRef<Path>) -> Result<ProgramSpec, ConfigError> {
    read_spec(path)
}

fn read_spec<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&contents)?),
        Some("dhall") => serde_dhall::from_str(&contents).parse().map_err(|e| ConfigError::Dhall(Box::new(e))),
        _ => Err(ConfigError::UnknownFileType(path.into())),
    }
}

/// Errors loading or building a topology/program spec.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file's extension wasn't `.json` or `.dhall`.
    #[error("unrecognized spec file extension: {0}")]
    UnknownFileType(PathBuf),
    /// An error parsing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    /// An error parsing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),
    /// An I/O error reading the spec file.
    #[error("IO error")]
    Io(#[from] std::io::Error),
    /// A link or message referenced a node index outside the topology's node count.
    #[error("node index {0} out of range")]
    UnknownNodeIndex(usize),
    /// A message's `after` list named a message not present in the spec.
    #[error("unknown message name: {0}")]
    UnknownMessageName(String),
    /// Building the network from a [`TopologySpec`] failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
