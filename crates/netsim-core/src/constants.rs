//! Simulation constants.

use crate::units::Bytes;

/// Default maximum packet payload size used by [`Message::make_packets`](crate::packet::Message::make_packets)
/// when the caller doesn't specify one.
pub const DEFAULT_MAX_PACKET_SIZE: Bytes = Bytes::new(1000);

/// Packet header size used by [`PacketSizing::Framed`](crate::packet::PacketSizing::Framed).
pub const SZ_PKTHDR: Bytes = Bytes::new(48);
