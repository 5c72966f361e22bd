//! The simulation core: event loop, link transmitter state machine, and packet forwarding.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::constants::DEFAULT_MAX_PACKET_SIZE;
use crate::contention::{ContentionError, ContentionSink};
use crate::event::Event;
use crate::graph::{LinkId, NodeId, Topology, TopologyError};
use crate::packet::{Completion, Message, MessageId, Packet, PacketSizing};
use crate::pqueue::PriorityQueue;
use crate::program::Program;
use crate::routing::Routes;
use crate::units::{Bytes, Seconds};

/// Errors raised while building or running a [`Network`].
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// `forward` was invoked before [`Network::initialize_routes`].
    #[error("routes not initialized; call initialize_routes() before run()")]
    RoutesNotInitialized,
    /// No path exists between `src` and `dst`.
    #[error("no route from {src:?} to {dst:?}")]
    NoRoute { src: NodeId, dst: NodeId },
    /// `run` popped from an empty priority queue. Should be unreachable: `run` checks
    /// `is_empty()` before every pop.
    #[error("priority queue unexpectedly empty")]
    EmptyQueue,
    #[error(transparent)]
    Contention(#[from] ContentionError),
}

#[derive(Debug, Default)]
struct LinkRuntime {
    queue: VecDeque<Packet>,
    in_flight: Option<Packet>,
}

impl LinkRuntime {
    fn active_messages(&self) -> usize {
        let mut seen = rustc_hash::FxHashSet::default();
        for p in self.queue.iter().chain(self.in_flight.iter()) {
            seen.insert(p.message);
        }
        seen.len()
    }
}

/// A discrete-event network simulator: a graph of nodes and links, a route table, and the event
/// loop that drives messages across it under bandwidth contention and propagation delay.
pub struct Network {
    topology: Topology,
    routes: Option<Routes>,
    now: Seconds,
    queue: PriorityQueue<Event>,
    links: Vec<LinkRuntime>,
    packet_sizing: PacketSizing,
    max_packet_size: Bytes,
    messages: FxHashMap<MessageId, Message>,
    completions: FxHashMap<MessageId, Seconds>,
    program: Option<Program>,
    contention_sink: Option<Box<dyn ContentionSink>>,
    contention_header_written: bool,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("now", &self.now)
            .field("link_count", &self.links.len())
            .field("queued_events", &self.queue.len())
            .finish()
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Creates an empty network with [`PacketSizing::ZeroOverhead`] packets and
    /// [`DEFAULT_MAX_PACKET_SIZE`] fragmentation.
    pub fn new() -> Self {
        Self {
            topology: Topology::new(),
            routes: None,
            now: Seconds::ZERO,
            queue: PriorityQueue::new(),
            links: Vec::new(),
            packet_sizing: PacketSizing::ZeroOverhead,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            messages: FxHashMap::default(),
            completions: FxHashMap::default(),
            program: None,
            contention_sink: None,
            contention_header_written: false,
        }
    }

    /// Overrides the packet sizing scheme used to compute serialization time.
    pub fn with_packet_sizing(mut self, sizing: PacketSizing) -> Self {
        self.packet_sizing = sizing;
        self
    }

    /// Overrides the maximum packet payload size used by [`Message::make_packets`].
    pub fn with_max_packet_size(mut self, size: Bytes) -> Self {
        self.max_packet_size = size;
        self
    }

    /// Installs a sink that receives a contention log row after every dispatched event.
    pub fn set_contention_sink(&mut self, sink: Box<dyn ContentionSink>) {
        self.contention_sink = Some(sink);
        self.contention_header_written = false;
    }

    /// Adds a node and returns its handle.
    pub fn add_node(&mut self) -> NodeId {
        self.topology.add_node()
    }

    /// Installs a directed link `src -> dst`.
    pub fn join(
        &mut self,
        src: NodeId,
        dst: NodeId,
        bandwidth: crate::units::BitsPerSec,
        delay: Seconds,
    ) -> Result<LinkId, NetworkError> {
        let id = self.topology.join(src, dst, bandwidth, delay)?;
        if id.inner() == self.links.len() {
            self.links.push(LinkRuntime::default());
        }
        Ok(id)
    }

    /// Installs two independent directed links `a -> b` and `b -> a`.
    pub fn join_symmetric(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: crate::units::BitsPerSec,
        delay: Seconds,
    ) -> Result<(LinkId, LinkId), NetworkError> {
        let ab = self.join(a, b, bandwidth, delay)?;
        let ba = self.join(b, a, bandwidth, delay)?;
        Ok((ab, ba))
    }

    /// Computes BFS shortest-path routes over the current topology. Must be called before
    /// [`Network::run`] or [`Network::run_program`].
    pub fn initialize_routes(&mut self) {
        self.routes = Some(Routes::build(&self.topology));
    }

    /// Injects `message` into the graph at `message.src`. Goes through the event queue (scheduled
    /// at the current time) rather than executing synchronously, so that directly-injected
    /// messages and program-released messages are sequenced identically.
    pub fn inject(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.insert(id, message);
        self.queue.add(Event::InjectMessage(message), self.now);
        id
    }

    /// Adopts `program`, injects its initially-ready messages, and runs the simulation to
    /// completion. Returns the final simulated time.
    ///
    /// If any message remains unreleased when the queue drains (an unsatisfiable, typically
    /// cyclic, dependency), a warning is logged naming the stuck messages; `run_program` does not
    /// fail because of it.
    pub fn run_program(&mut self, program: Program) -> Result<Seconds, NetworkError> {
        self.program = Some(program);
        self.inject_ready();
        let final_time = self.run()?;
        if let Some(program) = &self.program {
            let pending = program.pending();
            if !pending.is_empty() {
                log::warn!("dependency cycle: {} message(s) never released: {pending:?}", pending.len());
            }
        }
        Ok(final_time)
    }

    /// Runs the event loop until the queue drains. Returns the final simulated time.
    pub fn run(&mut self) -> Result<Seconds, NetworkError> {
        self.write_contention_header()?;
        while !self.queue.is_empty() {
            let (t, event) = self.queue.pop().map_err(|_| NetworkError::EmptyQueue)?;
            assert!(t >= self.now, "event scheduled in the past: {t} < {}", self.now);
            self.now = t;
            log::trace!("t={} dispatch {event:?}", self.now);
            self.dispatch(event)?;
            self.log_contention_row()?;
        }
        Ok(self.now)
    }

    /// Tears down clock, event queue, link state, and route tables. Topology is preserved; call
    /// [`Network::initialize_routes`] again before the next run.
    pub fn reset(&mut self) {
        self.now = Seconds::ZERO;
        self.queue = PriorityQueue::new();
        for link in &mut self.links {
            *link = LinkRuntime::default();
        }
        self.routes = None;
        self.messages.clear();
        self.completions.clear();
        self.program = None;
        self.contention_header_written = false;
    }

    /// The completion time of `id`, if it has been delivered.
    pub fn completion_time(&self, id: MessageId) -> Option<Seconds> {
        self.completions.get(&id).copied()
    }

    fn dispatch(&mut self, event: Event) -> Result<(), NetworkError> {
        match event {
            Event::InjectMessage(message) => self.handle_inject(message)?,
            Event::TxDone(link) => self.handle_tx_done(link),
            Event::Recv(node, packet) => self.handle_recv(node, packet)?,
        }
        Ok(())
    }

    fn handle_inject(&mut self, message: Message) -> Result<(), NetworkError> {
        let packets = message.make_packets(self.max_packet_size);
        log::debug!("message {:?} released: {} packet(s)", message.id, packets.len());
        for packet in packets {
            self.forward_from(message.src, packet)?;
        }
        Ok(())
    }

    fn forward_from(&mut self, node: NodeId, packet: Packet) -> Result<(), NetworkError> {
        if packet.dst == node {
            self.deliver(packet);
            return Ok(());
        }
        let routes = self.routes.as_ref().ok_or(NetworkError::RoutesNotInitialized)?;
        let link_id = routes
            .next_hop(node, packet.dst)
            .ok_or(NetworkError::NoRoute { src: node, dst: packet.dst })?;
        self.links[link_id.inner()].queue.push_back(packet);
        self.link_send(link_id);
        Ok(())
    }

    fn link_send(&mut self, link_id: LinkId) {
        let idx = link_id.inner();
        if self.links[idx].in_flight.is_some() {
            return;
        }
        let Some(packet) = self.links[idx].queue.pop_front() else {
            return;
        };
        let link = *self.topology.link(link_id);
        let tx_time = link.bandwidth.serialization_time(packet.size(self.packet_sizing));
        let done_at = self.now.saturating_add(tx_time);
        let recv_at = done_at.saturating_add(link.delay);
        self.links[idx].in_flight = Some(packet);
        self.queue.add(Event::TxDone(link_id), done_at);
        self.queue.add(Event::Recv(link.dst, packet), recv_at);
        log::debug!(
            "link {idx} serializing packet {}/{} of message {:?} (done at {done_at})",
            packet.sequence_number + 1,
            packet.total_packets,
            packet.message
        );
    }

    fn handle_tx_done(&mut self, link_id: LinkId) {
        let idx = link_id.inner();
        self.links[idx].in_flight = None;
        log::debug!("link {idx} idle");
        self.link_send(link_id);
    }

    fn handle_recv(&mut self, node: NodeId, packet: Packet) -> Result<(), NetworkError> {
        if packet.dst != node {
            return self.forward_from(node, packet);
        }
        if !packet.is_last() {
            return Ok(());
        }
        self.deliver(packet);
        Ok(())
    }

    fn deliver(&mut self, packet: Packet) {
        let Some(message) = self.messages.remove(&packet.message) else {
            return;
        };
        self.completions.insert(message.id, self.now);
        log::debug!("message {:?} delivered at t={}", message.id, self.now);
        if let Completion::NotifyProgram(id) = message.completion {
            if let Some(program) = self.program.as_mut() {
                program.notify_delivered(id);
            }
            self.inject_ready();
        }
    }

    fn inject_ready(&mut self) {
        let Some(program) = self.program.as_mut() else {
            return;
        };
        let ready = program.pop_ready_messages();
        for message in ready {
            let delay = self.program.as_ref().expect("just matched Some above").delay_of(message.id);
            self.messages.insert(message.id, message);
            self.queue.add(Event::InjectMessage(message), self.now.saturating_add(delay));
        }
    }

    fn write_contention_header(&mut self) -> Result<(), NetworkError> {
        if self.contention_header_written {
            return Ok(());
        }
        if let Some(sink) = self.contention_sink.as_mut() {
            sink.write_header(self.links.len())?;
        }
        self.contention_header_written = true;
        Ok(())
    }

    fn log_contention_row(&mut self) -> Result<(), NetworkError> {
        let Some(sink) = self.contention_sink.as_mut() else {
            return Ok(());
        };
        let counts: Vec<usize> = self.links.iter().map(LinkRuntime::active_messages).collect();
        sink.write_row(self.now, &counts)?;
        Ok(())
    }
}
