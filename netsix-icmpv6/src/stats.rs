//! Per-endpoint ICMPv6 statistics
//!
//! One counter per message type in each direction, plus `invalid` for
//! received messages that failed validation and `dropped` for replies
//! that could not be transmitted. Counters are monotonic and never
//! consulted for control decisions.

use netsix_core::Counter;

/// Counters for received ICMPv6 messages
#[derive(Debug, Default)]
pub struct Icmpv6ReceivedStats {
    /// Echo Request messages
    pub echo_request: Counter,
    /// Echo Reply messages
    pub echo_reply: Counter,
    /// Destination Unreachable messages
    pub dst_unreachable: Counter,
    /// Packet Too Big messages
    pub packet_too_big: Counter,
    /// Time Exceeded messages
    pub time_exceeded: Counter,
    /// Parameter Problem messages
    pub param_problem: Counter,
    /// Router Solicitation messages
    pub router_solicit: Counter,
    /// Router Advertisement messages
    pub router_advert: Counter,
    /// Neighbor Solicitation messages
    pub neighbor_solicit: Counter,
    /// Neighbor Advertisement messages
    pub neighbor_advert: Counter,
    /// Redirect messages
    pub redirect: Counter,
    /// Messages dropped by validation: truncated, bad checksum, failed
    /// gate checks, malformed options, or unknown type
    pub invalid: Counter,
}

/// Counters for sent ICMPv6 messages
///
/// The full per-type set is exposed so every component that originates
/// ICMPv6 traffic shares one stats block; this engine itself only sends
/// echo replies, solicitations, and advertisements.
#[derive(Debug, Default)]
pub struct Icmpv6SentStats {
    /// Echo Request messages
    pub echo_request: Counter,
    /// Echo Reply messages
    pub echo_reply: Counter,
    /// Destination Unreachable messages
    pub dst_unreachable: Counter,
    /// Packet Too Big messages
    pub packet_too_big: Counter,
    /// Time Exceeded messages
    pub time_exceeded: Counter,
    /// Parameter Problem messages
    pub param_problem: Counter,
    /// Router Solicitation messages
    pub router_solicit: Counter,
    /// Router Advertisement messages
    pub router_advert: Counter,
    /// Neighbor Solicitation messages
    pub neighbor_solicit: Counter,
    /// Neighbor Advertisement messages
    pub neighbor_advert: Counter,
    /// Redirect messages
    pub redirect: Counter,
    /// Packets the link endpoint failed to transmit
    pub dropped: Counter,
}

/// Statistics for one ICMPv6 endpoint, shared with the surrounding stack
#[derive(Debug, Default)]
pub struct Icmpv6Stats {
    /// Received direction
    pub received: Icmpv6ReceivedStats,
    /// Sent direction
    pub sent: Icmpv6SentStats,
}

impl Icmpv6Stats {
    /// Create a statistics block with all counters at zero
    pub fn new() -> Self {
        Icmpv6Stats::default()
    }
}
