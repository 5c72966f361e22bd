//! A discrete-event network simulator: a priority-queue-driven event loop that moves messages,
//! fragmented into packets, across a graph of nodes and links under bandwidth contention and
//! propagation delay.
//!
//! This crate re-exports [`netsim_core`]'s engine directly and adds [`io`] for loading
//! topologies and message programs from spec files instead of building them by hand.

#![warn(unreachable_pub, missing_docs)]

pub use netsim_core::*;

/// Loading topologies and message programs from JSON or Dhall spec files.
pub mod io {
    pub use netsim_io::*;
}
