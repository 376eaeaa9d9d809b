//! Well-known IPv6 addresses and link-layer mappings
//!
//! Multicast group constants from RFC 4291 §2.7.1 and the deterministic
//! IPv6-multicast-to-Ethernet mapping from RFC 2464 §7.

use netsix_core::LinkAddr;
use std::net::Ipv6Addr;

/// All-nodes link-local multicast group (ff02::1)
pub const ALL_NODES: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);

/// All-routers link-local multicast group (ff02::2)
pub const ALL_ROUTERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 2);

/// Base of the solicited-node multicast range (ff02::1:ff00:0/104)
pub const SOLICITED_NODE_PREFIX: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 1, 0xff00, 0);

/// Solicited-node multicast group of an address
///
/// Appends the low 24 bits of `addr` to the solicited-node prefix
/// (RFC 4291 §2.7.1).
pub fn solicited_node_multicast(addr: Ipv6Addr) -> Ipv6Addr {
    let mut octets = SOLICITED_NODE_PREFIX.octets();
    octets[13..16].copy_from_slice(&addr.octets()[13..16]);
    Ipv6Addr::from(octets)
}

/// Ethernet address of an IPv6 multicast group
///
/// 33:33 followed by the low 32 bits of the group address (RFC 2464 §7).
/// Only meaningful for multicast addresses; callers check.
pub fn ethernet_multicast(addr: Ipv6Addr) -> LinkAddr {
    let octets = addr.octets();
    LinkAddr::new([0x33, 0x33, octets[12], octets[13], octets[14], octets[15]])
}

/// Check for a link-local unicast address (fe80::/10)
pub fn is_link_local(addr: Ipv6Addr) -> bool {
    let octets = addr.octets();
    octets[0] == 0xfe && (octets[1] & 0xc0) == 0x80
}
