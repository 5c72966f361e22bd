//! Messages and the packets they're fragmented into.

use crate::graph::NodeId;
use crate::units::Bytes;

identifier!(MessageId, usize);

/// The action taken when a message's last packet is delivered.
///
/// Modeled as tagged data rather than a callback so the event loop can interpret it directly
/// instead of invoking a captured closure over the whole simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// No further action; the message was injected directly via [`Network::inject`](crate::network::Network::inject).
    None,
    /// Notify the [`Program`](crate::program::Program) that this message has been delivered, so
    /// any dependents can be released.
    NotifyProgram(MessageId),
}

/// A unit of data to be delivered from `src` to `dst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Message {
    pub id: MessageId,
    pub src: NodeId,
    pub dst: NodeId,
    pub count: Bytes,
    pub completion: Completion,
}

impl Message {
    /// Creates a message with no completion action. `count` must be at least one byte.
    pub fn new(id: MessageId, src: NodeId, dst: NodeId, count: Bytes) -> Self {
        assert!(count.into_u64() >= 1, "message count must be at least 1 byte");
        Self {
            id,
            src,
            dst,
            count,
            completion: Completion::None,
        }
    }

    /// Returns a copy of this message wired to notify the program runtime on completion.
    pub fn notify_program(mut self) -> Self {
        self.completion = Completion::NotifyProgram(self.id);
        self
    }

    /// Fragments this message into `ceil(count / max_packet_size)` packets. Every packet except
    /// possibly the last carries `max_packet_size` payload bytes; the last carries the
    /// remainder. Packets are numbered `0..k-1`.
    pub fn make_packets(&self, max_packet_size: Bytes) -> Vec<Packet> {
        assert!(max_packet_size.into_u64() >= 1, "max packet size must be at least 1 byte");
        let count = self.count.into_u64();
        let max = max_packet_size.into_u64();
        let total_packets = count.div_ceil(max) as usize;
        (0..total_packets)
            .map(|i| {
                let already_sent = i as u64 * max;
                let payload = (count - already_sent).min(max);
                Packet {
                    message: self.id,
                    src: self.src,
                    dst: self.dst,
                    sequence_number: i,
                    total_packets,
                    payload_size: Bytes::new(payload),
                }
            })
            .collect()
    }
}

/// How a packet's on-wire size is derived from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketSizing {
    /// `size() == payload_size`.
    #[default]
    ZeroOverhead,
    /// `size() == 1 (start) + 2 (seq) + header + payload + 4 (ECRC) + 1 (end)`.
    Framed { header: Bytes },
}

impl PacketSizing {
    /// The on-wire size of a packet carrying `payload` bytes under this sizing scheme.
    pub fn size_of(&self, payload: Bytes) -> Bytes {
        match self {
            PacketSizing::ZeroOverhead => payload,
            PacketSizing::Framed { header } => {
                Bytes::new(1 + 2 + header.into_u64() + payload.into_u64() + 4 + 1)
            }
        }
    }
}

/// A fragment of a [`Message`] traveling through the network one hop at a time.
///
/// A packet knows its position in its message's packet chain (`sequence_number`,
/// `total_packets`) rather than holding a direct pointer to "the next packet" -- packets are
/// moved by value through [`Event::Recv`](crate::event::Event::Recv), so a chain is easiest to
/// express as a position within the whole, not a link in an owned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet {
    pub message: MessageId,
    pub src: NodeId,
    pub dst: NodeId,
    pub sequence_number: usize,
    pub total_packets: usize,
    pub payload_size: Bytes,
}

impl Packet {
    /// Whether this is the last packet of its message.
    pub fn is_last(&self) -> bool {
        self.sequence_number + 1 == self.total_packets
    }

    /// The on-wire size of this packet under `sizing`.
    pub fn size(&self, sizing: PacketSizing) -> Bytes {
        sizing.size_of(self.payload_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(count: u64) -> Message {
        Message::new(MessageId::new(0), NodeId::new(0), NodeId::new(1), Bytes::new(count))
    }

    #[test]
    fn make_packets_splits_evenly() {
        let packets = msg(300).make_packets(Bytes::new(100));
        assert_eq!(packets.len(), 3);
        assert!(packets.iter().all(|p| p.payload_size == Bytes::new(100)));
        assert!(packets[2].is_last());
        assert!(!packets[0].is_last());
    }

    #[test]
    fn make_packets_carries_remainder_in_last_packet() {
        let packets = msg(250).make_packets(Bytes::new(100));
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].payload_size, Bytes::new(100));
        assert_eq!(packets[1].payload_size, Bytes::new(100));
        assert_eq!(packets[2].payload_size, Bytes::new(50));
    }

    #[test]
    fn sequence_numbers_are_contiguous() {
        let packets = msg(250).make_packets(Bytes::new(100));
        let seqs: Vec<_> = packets.iter().map(|p| p.sequence_number).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn zero_overhead_size_is_payload_size() {
        let p = msg(128).make_packets(Bytes::new(128)).remove(0);
        assert_eq!(p.size(PacketSizing::ZeroOverhead), Bytes::new(128));
    }

    #[test]
    fn framed_size_adds_header_and_trailer() {
        let p = msg(128).make_packets(Bytes::new(128)).remove(0);
        let sizing = PacketSizing::Framed { header: Bytes::new(48) };
        assert_eq!(p.size(sizing), Bytes::new(1 + 2 + 48 + 128 + 4 + 1));
    }
}
