//! The fluid contention model, documented for reference only.
//!
//! This module is *not* wired into [`Network::run`](crate::network::Network::run) or
//! [`Network::run_program`](crate::network::Network::run_program) -- the packet-level
//! store-and-forward model in [`crate::network`] is the one the event loop actually executes.
//! The types and functions here exist to describe an alternative modeling style considered for
//! this simulator, in which a message occupies every link on its route simultaneously for its
//! whole lifetime and shares each link's bandwidth equally with whatever else is active on it.
//!
//! The alternative is inferior for this simulator's purposes: it has no natural way to encode
//! store-and-forward propagation latency (a message "occupies" a link for its entire transfer,
//! rather than handing packets across link by link), and it produces discontinuities when a
//! link's active set becomes momentarily empty mid-transfer. It's kept here, rather than
//! dropped, because it is the model some designs of this kind start from before discovering the
//! packet-level alternative, and because one of its subtler bugs is worth documenting in code
//! rather than prose alone (see [`recompute_finish_times`] below).

use rustc_hash::FxHashMap;

use crate::graph::LinkId;
use crate::packet::MessageId;
use crate::units::{BitsPerSec, Bytes, Seconds};

/// A message's progress under the fluid model: how many bytes it has transferred so far, and the
/// links it currently occupies.
#[derive(Debug, Clone)]
pub struct FluidMessageState {
    pub total: Bytes,
    pub delivered: Bytes,
    pub route: Vec<LinkId>,
}

impl FluidMessageState {
    /// Bytes remaining to deliver.
    pub fn remaining(&self) -> Bytes {
        Bytes::new(self.total.into_u64().saturating_sub(self.delivered.into_u64()))
    }
}

/// `bandwidth / active_count`, or the link's nominal bandwidth if nothing is active on it.
pub fn effective_bandwidth(nominal: BitsPerSec, active_count: usize) -> BitsPerSec {
    if active_count == 0 {
        nominal
    } else {
        BitsPerSec::new(nominal.into_f64() / active_count as f64)
    }
}

/// A message's instantaneous throughput: the minimum effective bandwidth over every link on its
/// route.
pub fn throughput(route: &[LinkId], effective: &FxHashMap<LinkId, BitsPerSec>) -> BitsPerSec {
    route
        .iter()
        .filter_map(|link| effective.get(link))
        .copied()
        .fold(BitsPerSec::INFINITE, |acc, bw| if bw.into_f64() < acc.into_f64() { bw } else { acc })
}

/// Recomputes every active message's progress and remaining-time estimate after `elapsed`
/// simulated seconds have passed at the given (now-stale) per-message throughputs, then derives
/// each message's new finish-time estimate from its freshly recomputed throughput.
///
/// A prototype of this model mutated `message.progress` using the throughput computed *after*
/// the active-set change it was reacting to, rather than the throughput that was actually in
/// effect during the `elapsed` interval just finished -- using the new bandwidth to account for
/// old progress. This function keeps the two stages explicit and separately complete: progress
/// is integrated against `throughput_during_elapsed` for every message before any message's
/// finish time is recomputed against `throughput_after_change`.
pub fn recompute_finish_times(
    states: &mut FxHashMap<MessageId, FluidMessageState>,
    throughput_during_elapsed: &FxHashMap<MessageId, BitsPerSec>,
    elapsed: Seconds,
    throughput_after_change: &FxHashMap<MessageId, BitsPerSec>,
) -> FxHashMap<MessageId, Seconds> {
    // Stage 1: integrate progress using the throughput that was actually in effect.
    for (id, state) in states.iter_mut() {
        let bw = throughput_during_elapsed.get(id).copied().unwrap_or(BitsPerSec::ZERO);
        let bytes_sent = (bw.into_f64() * elapsed.into_f64() / 8.0) as u64;
        let delivered = (state.delivered.into_u64() + bytes_sent).min(state.total.into_u64());
        state.delivered = Bytes::new(delivered);
    }

    // Stage 2: derive each message's new remaining-time estimate from the new throughput, now
    // that every message's progress reflects the interval just finished.
    states
        .iter()
        .map(|(id, state)| {
            let bw = throughput_after_change.get(id).copied().unwrap_or(BitsPerSec::ZERO);
            let remaining_bits = state.remaining().into_f64() * 8.0;
            let finish = if bw.into_f64() > 0.0 {
                Seconds::new(remaining_bits / bw.into_f64())
            } else {
                Seconds::new(f64::INFINITY)
            };
            (*id, finish)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_bandwidth_splits_evenly() {
        let bw = BitsPerSec::new(1000.0);
        assert_eq!(effective_bandwidth(bw, 0), bw);
        assert_eq!(effective_bandwidth(bw, 4), BitsPerSec::new(250.0));
    }

    #[test]
    fn throughput_is_bottleneck_link() {
        let mut effective = FxHashMap::default();
        effective.insert(LinkId::new(0), BitsPerSec::new(1000.0));
        effective.insert(LinkId::new(1), BitsPerSec::new(200.0));
        let route = vec![LinkId::new(0), LinkId::new(1)];
        assert_eq!(throughput(&route, &effective), BitsPerSec::new(200.0));
    }

    #[test]
    fn progress_uses_interval_throughput_not_post_change_throughput() {
        let mut states = FxHashMap::default();
        let id = MessageId::new(0);
        states.insert(
            id,
            FluidMessageState {
                total: Bytes::new(1000),
                delivered: Bytes::new(0),
                route: vec![LinkId::new(0)],
            },
        );
        let mut during = FxHashMap::default();
        during.insert(id, BitsPerSec::new(800.0)); // 100 bytes/s
        let mut after = FxHashMap::default();
        after.insert(id, BitsPerSec::new(8000.0)); // would be 1000 bytes/s if misapplied

        recompute_finish_times(&mut states, &during, Seconds::new(1.0), &after);
        // Progress must reflect the 800bps interval rate (100 bytes), not the post-change rate.
        assert_eq!(states[&id].delivered, Bytes::new(100));
    }
}
